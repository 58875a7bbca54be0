//! Product search and details.

// self
use crate::{
	_prelude::*,
	api,
	auth::{LocationId, ProductId},
	flows::Broker,
	obs::{self, FlowKind},
};

/// Page size used when the caller has no preference.
pub const DEFAULT_PRODUCT_LIMIT: u32 = 10;

/// Product search parameters.
///
/// Exactly one criterion is sent upstream. When several are set the priority is
/// term, then brand, then product id; empty strings count as unset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSearch {
	/// Store whose inventory and pricing are searched.
	pub location_id: LocationId,
	/// Free-text search term.
	pub term: Option<String>,
	/// Brand name.
	pub brand: Option<String>,
	/// Product identifier.
	pub product_id: Option<String>,
	/// Page size.
	pub limit: u32,
	/// Zero-based offset of the first result.
	pub start: u32,
}
impl ProductSearch {
	/// Starts a search scoped to `location_id` with default paging and no criterion.
	pub fn new(location_id: LocationId) -> Self {
		Self {
			location_id,
			term: None,
			brand: None,
			product_id: None,
			limit: DEFAULT_PRODUCT_LIMIT,
			start: 0,
		}
	}

	/// Sets the search term.
	pub fn with_term(mut self, term: impl Into<String>) -> Self {
		self.term = Some(term.into());

		self
	}

	/// Sets the brand filter.
	pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
		self.brand = Some(brand.into());

		self
	}

	/// Sets the product id filter.
	pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
		self.product_id = Some(product_id.into());

		self
	}

	/// Sets the page size.
	pub fn with_limit(mut self, limit: u32) -> Self {
		self.limit = limit;

		self
	}

	/// Sets the result offset.
	pub fn with_start(mut self, start: u32) -> Self {
		self.start = start;

		self
	}

	/// The criterion that will be sent, if any.
	pub fn criterion(&self) -> Option<ProductCriterion<'_>> {
		fn present(value: &Option<String>) -> Option<&str> {
			value.as_deref().filter(|value| !value.is_empty())
		}

		present(&self.term)
			.map(ProductCriterion::Term)
			.or_else(|| present(&self.brand).map(ProductCriterion::Brand))
			.or_else(|| present(&self.product_id).map(ProductCriterion::ProductId))
	}
}

/// The single search criterion selected from a [`ProductSearch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductCriterion<'a> {
	/// `filter.term`.
	Term(&'a str),
	/// `filter.brand`.
	Brand(&'a str),
	/// `filter.productId`.
	ProductId(&'a str),
}
impl<'a> ProductCriterion<'a> {
	/// Query parameter name and value.
	pub fn as_param(self) -> (&'static str, &'a str) {
		match self {
			Self::Term(value) => ("filter.term", value),
			Self::Brand(value) => ("filter.brand", value),
			Self::ProductId(value) => ("filter.productId", value),
		}
	}
}

impl Broker {
	/// Searches products at a location.
	///
	/// Fails with [`Error::InvalidArgument`] before any network call when no criterion is set.
	pub async fn search_products(&self, search: &ProductSearch) -> Result<JsonValue> {
		let (key, value) = search
			.criterion()
			.ok_or_else(|| {
				Error::invalid_argument(
					"at least one search criterion (term, brand, or product id) is required",
				)
			})?
			.as_param();

		obs::observe(FlowKind::Resource, "search_products", async move {
			let token = self.client_token().await?;
			let request = self.http_client.get(self.config.endpoints.products.clone()).query(&[
				("filter.locationId", search.location_id.to_string()),
				("filter.limit", search.limit.to_string()),
				("filter.start", search.start.to_string()),
				(key, value.to_owned()),
			]);

			api::send_json("products", request, &token).await
		})
		.await
	}

	/// Fetches one product with location-specific pricing and availability.
	pub async fn product_details(
		&self,
		product_id: &ProductId,
		location_id: &LocationId,
	) -> Result<JsonValue> {
		obs::observe(FlowKind::Resource, "product_details", async move {
			let token = self.client_token().await?;
			let request = self
				.http_client
				.get(self.config.endpoints.product(product_id))
				.query(&[("filter.locationId", location_id.as_str())]);

			api::send_json("product details", request, &token).await
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn search() -> ProductSearch {
		ProductSearch::new(LocationId::new("01400943").expect("Location fixture should be valid."))
	}

	#[test]
	fn criterion_priority_is_term_brand_product() {
		assert_eq!(search().criterion(), None);
		assert_eq!(
			search().with_product_id("0001111041700").with_brand("Kroger").criterion(),
			Some(ProductCriterion::Brand("Kroger"))
		);
		assert_eq!(
			search().with_brand("Kroger").with_term("milk").criterion(),
			Some(ProductCriterion::Term("milk"))
		);
		assert_eq!(
			search().with_term("").with_product_id("0001111041700").criterion(),
			Some(ProductCriterion::ProductId("0001111041700"))
		);
	}

	#[test]
	fn defaults_page_from_zero() {
		let search = search();

		assert_eq!(search.limit, 10);
		assert_eq!(search.start, 0);
		assert_eq!(ProductCriterion::ProductId("x").as_param(), ("filter.productId", "x"));
	}
}
