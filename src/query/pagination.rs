use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    DatabaseConnection, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, QuerySelect, Select,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use super::QueryError;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 50;

/// Requested page of a listing.
///
/// The page size is clamped to [`MAX_PAGE_SIZE`] whenever it is written, including
/// when it is deserialized from a query string. Zero values survive construction
/// and are rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate, utoipa::IntoParams)]
#[serde(from = "RawPageRequest")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct PageRequest {
    #[validate(range(min = 1))]
    #[param(minimum = 1, example = 1, default = 1)]
    page_number: u64,
    #[validate(range(min = 1, max = 50))]
    #[param(minimum = 1, maximum = 50, example = 10, default = 10)]
    page_size: u64,
}

#[derive(Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawPageRequest {
    page_number: u64,
    page_size: u64,
}

impl Default for RawPageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl From<RawPageRequest> for PageRequest {
    fn from(raw: RawPageRequest) -> Self {
        PageRequest::new(raw.page_number, raw.page_size)
    }
}

impl PageRequest {
    pub fn new(page_number: u64, page_size: u64) -> Self {
        let mut request = Self {
            page_number,
            page_size: DEFAULT_PAGE_SIZE,
        };
        request.set_page_size(page_size);
        request
    }

    pub fn page_number(&self) -> u64 {
        self.page_number
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn set_page_number(&mut self, page_number: u64) {
        self.page_number = page_number;
    }

    pub fn set_page_size(&mut self, page_size: u64) {
        self.page_size = page_size.min(MAX_PAGE_SIZE);
    }

    /// Fetches this page from `source`.
    pub async fn fetch<T, S>(&self, source: &S) -> Result<PageResult<T>, QueryError>
    where
        S: PageSource<T> + ?Sized,
    {
        paginate(source, self.page_number, self.page_size).await
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        RawPageRequest::default().into()
    }
}

/// One page of records plus the numbers needed to navigate the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    items: Vec<T>,
    total_count: u64,
    total_pages: u64,
    page_number: u64,
    page_size: u64,
    has_previous_page: bool,
    has_next_page: bool,
}

impl<T> PageResult<T> {
    fn new(items: Vec<T>, total_count: u64, page_number: u64, page_size: u64) -> Self {
        let total_pages = total_count.div_ceil(page_size);
        Self {
            items,
            total_count,
            total_pages,
            page_number,
            page_size,
            has_previous_page: page_number > 1,
            has_next_page: page_number < total_pages,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn page_number(&self) -> u64 {
        self.page_number
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn has_previous_page(&self) -> bool {
        self.has_previous_page
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// Converts the items, keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> PageResult<U>
    where
        F: FnMut(T) -> U,
    {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            total_pages: self.total_pages,
            page_number: self.page_number,
            page_size: self.page_size,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}

/// An ordered collection that can report its size and hand out a contiguous slice
/// without loading everything else.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn count(&self) -> Result<u64, DbErr>;
    async fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<T>, DbErr>;
}

/// A composed select bound to the connection it runs on.
pub struct SelectSource<'db, E: EntityTrait> {
    select: Select<E>,
    db: &'db DatabaseConnection,
}

impl<'db, E: EntityTrait> SelectSource<'db, E> {
    pub fn new(select: Select<E>, db: &'db DatabaseConnection) -> Self {
        Self { select, db }
    }

    /// Reads the rows as `M` instead of the entity model, for selects that pick
    /// their own columns.
    pub fn into_model<M: FromQueryResult>(self) -> ModelSource<'db, E, M> {
        ModelSource {
            select: self.select,
            db: self.db,
            model: PhantomData,
        }
    }
}

#[async_trait]
impl<'db, E> PageSource<E::Model> for SelectSource<'db, E>
where
    E: EntityTrait,
    E::Model: Sync,
{
    async fn count(&self) -> Result<u64, DbErr> {
        self.select.clone().count(self.db).await
    }

    async fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<E::Model>, DbErr> {
        self.select
            .clone()
            .offset(offset)
            .limit(limit)
            .all(self.db)
            .await
    }
}

pub struct ModelSource<'db, E: EntityTrait, M> {
    select: Select<E>,
    db: &'db DatabaseConnection,
    model: PhantomData<fn() -> M>,
}

#[async_trait]
impl<'db, E, M> PageSource<M> for ModelSource<'db, E, M>
where
    E: EntityTrait,
    E::Model: Sync,
    M: FromQueryResult + Send + Sync,
{
    async fn count(&self) -> Result<u64, DbErr> {
        self.select.clone().count(self.db).await
    }

    async fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<M>, DbErr> {
        self.select
            .clone()
            .offset(offset)
            .limit(limit)
            .into_model::<M>()
            .all(self.db)
            .await
    }
}

#[async_trait]
impl<T> PageSource<T> for Vec<T>
where
    T: Clone + Send + Sync,
{
    async fn count(&self) -> Result<u64, DbErr> {
        Ok(self.len() as u64)
    }

    async fn fetch(&self, offset: u64, limit: u64) -> Result<Vec<T>, DbErr> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self.iter().skip(offset).take(limit).cloned().collect())
    }
}

/// Returns page `page_number` (1-based) of `source`, `page_size` records per page.
///
/// The order of `source` is kept as is. `page_size` is not clamped here; callers
/// go through [`PageRequest`] for that. A page past the end is empty but still
/// carries the real totals.
pub async fn paginate<T, S>(
    source: &S,
    page_number: u64,
    page_size: u64,
) -> Result<PageResult<T>, QueryError>
where
    S: PageSource<T> + ?Sized,
{
    if page_number == 0 {
        return Err(QueryError::InvalidArgument(
            "page number must be at least 1".to_string(),
        ));
    }
    if page_size == 0 {
        return Err(QueryError::InvalidArgument(
            "page size must be at least 1".to_string(),
        ));
    }
    let offset = (page_number - 1).checked_mul(page_size).ok_or_else(|| {
        QueryError::InvalidArgument(format!(
            "page {page_number} with size {page_size} is out of range"
        ))
    })?;

    let total_count = source.count().await?;
    let items = if offset < total_count {
        source.fetch(offset, page_size).await?
    } else {
        vec![]
    };
    debug!(
        "Page {page_number} (size {page_size}, offset {offset}): {} of {total_count} record(s)",
        items.len()
    );

    Ok(PageResult::new(items, total_count, page_number, page_size))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn records(n: u64) -> Vec<u64> {
        (1..=n).collect()
    }

    #[test]
    fn page_size_is_clamped_on_construction() {
        let request = PageRequest::new(1, 1000);

        assert_eq!(request.page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn page_size_is_clamped_by_setter() {
        // Arrange
        let mut request = PageRequest::default();

        // Act
        request.set_page_size(51);

        // Assert
        assert_eq!(request.page_size(), 50);
        request.set_page_size(7);
        assert_eq!(request.page_size(), 7);
    }

    #[test]
    fn page_request_defaults() {
        let request = PageRequest::default();

        assert_eq!(request.page_number(), 1);
        assert_eq!(request.page_size(), DEFAULT_PAGE_SIZE);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn page_size_is_clamped_when_deserialized() {
        // Arrange
        let json = r#"{"pageNumber": 2, "pageSize": 1000}"#;

        // Act
        let request: PageRequest = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(request, PageRequest::new(2, 50));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn zero_values_fail_validation() {
        assert!(PageRequest::new(0, 10).validate().is_err());
        assert!(PageRequest::new(1, 0).validate().is_err());
    }

    #[tokio::test]
    async fn twenty_five_records_in_pages_of_ten() {
        let source = records(25);

        let first = paginate(&source, 1, 10).await.unwrap();
        assert_eq!(first.items(), &(1..=10).collect::<Vec<_>>()[..]);
        assert_eq!(first.total_count(), 25);
        assert_eq!(first.total_pages(), 3);
        assert!(first.has_next_page());
        assert!(!first.has_previous_page());

        let third = paginate(&source, 3, 10).await.unwrap();
        assert_eq!(third.items(), &[21, 22, 23, 24, 25]);
        assert!(!third.has_next_page());
        assert!(third.has_previous_page());

        let fourth = paginate(&source, 4, 10).await.unwrap();
        assert!(fourth.items().is_empty());
        assert_eq!(fourth.total_pages(), 3);
        assert_eq!(fourth.total_count(), 25);
        assert!(!fourth.has_next_page());
        assert!(fourth.has_previous_page());
    }

    #[tokio::test]
    async fn total_pages_is_ceiling_of_count_over_size() {
        for total in 0..=23u64 {
            for size in 1..=7u64 {
                let page = paginate(&records(total), 1, size).await.unwrap();
                let expected = (total + size - 1) / size;
                assert_eq!(page.total_pages(), expected, "total {total} size {size}");
            }
        }
    }

    #[tokio::test]
    async fn only_the_last_page_is_short() {
        // Arrange
        let total = 23u64;
        let size = 5u64;
        let source = records(total);

        for number in 1..=5u64 {
            // Act
            let page = paginate(&source, number, size).await.unwrap();

            // Assert
            let expected = if number < 5 {
                size
            } else {
                total - (number - 1) * size
            };
            assert_eq!(page.items().len() as u64, expected, "page {number}");
        }
    }

    #[tokio::test]
    async fn empty_source_has_no_pages() {
        let source: Vec<u64> = vec![];

        let first = paginate(&source, 1, 10).await.unwrap();
        assert_eq!(first.total_pages(), 0);
        assert!(!first.has_next_page());
        assert!(!first.has_previous_page());

        let second = paginate(&source, 2, 10).await.unwrap();
        assert!(second.items().is_empty());
        assert!(second.has_previous_page());
    }

    #[tokio::test]
    async fn same_arguments_give_same_page() {
        let source = records(17);

        let a = paginate(&source, 2, 4).await.unwrap();
        let b = paginate(&source, 2, 4).await.unwrap();

        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn zero_page_number_is_rejected() {
        let r = paginate(&records(3), 0, 10).await;

        assert!(matches!(r, Err(QueryError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn zero_page_size_is_rejected() {
        let r = paginate(&records(3), 1, 0).await;

        assert!(matches!(r, Err(QueryError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn overflowing_offset_is_rejected() {
        let r = paginate(&records(3), u64::MAX, 2).await;

        assert!(matches!(r, Err(QueryError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn paginator_does_not_clamp() {
        let page = paginate(&records(120), 1, 100).await.unwrap();

        assert_eq!(page.items().len(), 100);
        assert_eq!(page.page_size(), 100);
    }

    #[tokio::test]
    async fn map_keeps_metadata() {
        // Arrange
        let page = PageRequest::new(2, 2).fetch(&records(5)).await.unwrap();

        // Act
        let mapped = page.map(|n| format!("#{n}"));

        // Assert
        assert_eq!(mapped.items(), &["#3".to_string(), "#4".to_string()]);
        assert_eq!(mapped.total_count(), 5);
        assert_eq!(mapped.total_pages(), 3);
        assert!(mapped.has_next_page());
    }

    #[tokio::test]
    async fn serializes_in_camel_case() {
        let page = paginate(&records(3), 1, 2).await.unwrap();

        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "items": [1, 2],
                "totalCount": 3,
                "totalPages": 2,
                "pageNumber": 1,
                "pageSize": 2,
                "hasPreviousPage": false,
                "hasNextPage": true
            })
        );
    }
}
