//! Builds listing queries from filter values.
//!
//! Nothing here touches the database: each function returns a [`Select`] that
//! the paginator counts and slices later.

use entity::{author, comment, news, news_tag, tag};
use sea_orm::{
    ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use sea_query::{Expr, Func, JoinType, LikeExpr, Query, SimpleExpr};
use tracing::debug;

use super::filter::{AuthorFilter, CommentFilter, NewsFilter, SortKey, TagFilter};

const LIKE_ESCAPE: char = '!';

pub fn compose_news(filter: &NewsFilter) -> Select<news::Entity> {
    let mut select = news::Entity::find();

    if let Some(part) = non_empty(&filter.title_part) {
        select = select.filter(contains_ignore_case(news::Column::Title, part));
    }
    if let Some(part) = non_empty(&filter.content_part) {
        select = select.filter(contains_ignore_case(news::Column::Content, part));
    }
    if let Some(author_id) = filter.author_id {
        select = select.filter(news::Column::AuthorId.eq(author_id));
    }
    if let Some(name) = non_empty(&filter.author_name) {
        select = select.filter(
            news::Column::AuthorId.in_subquery(
                Query::select()
                    .column(author::Column::Id)
                    .from(author::Entity)
                    .and_where(author::Column::Name.eq(name))
                    .to_owned(),
            ),
        );
    }
    if !filter.tag_ids.is_empty() {
        select = select.filter(
            news::Column::Id.in_subquery(
                Query::select()
                    .column(news_tag::Column::NewsId)
                    .from(news_tag::Entity)
                    .and_where(news_tag::Column::TagId.is_in(filter.tag_ids.iter().copied()))
                    .to_owned(),
            ),
        );
    }
    if !filter.tag_names.is_empty() {
        select = select.filter(
            news::Column::Id.in_subquery(
                Query::select()
                    .column((news_tag::Entity, news_tag::Column::NewsId))
                    .from(news_tag::Entity)
                    .inner_join(
                        tag::Entity,
                        Expr::col((tag::Entity, tag::Column::Id))
                            .equals((news_tag::Entity, news_tag::Column::TagId)),
                    )
                    .and_where(tag::Column::Name.is_in(filter.tag_names.iter().cloned()))
                    .to_owned(),
            ),
        );
    }

    debug!("News listing: {:?}", filter);
    order_by_sort_key(
        select,
        filter.sort,
        news::Column::Created,
        news::Column::Modified,
        news::Column::Id,
    )
}

pub fn compose_comments(filter: &CommentFilter) -> Select<comment::Entity> {
    let mut select = comment::Entity::find();

    if let Some(news_id) = filter.news_id {
        select = select.filter(comment::Column::NewsId.eq(news_id));
    }
    if let Some(part) = non_empty(&filter.content_part) {
        select = select.filter(contains_ignore_case(comment::Column::Content, part));
    }

    debug!("Comment listing: {:?}", filter);
    order_by_sort_key(
        select,
        filter.sort,
        comment::Column::Created,
        comment::Column::Modified,
        comment::Column::Id,
    )
}

pub fn compose_tags(filter: &TagFilter) -> Select<tag::Entity> {
    let mut select = tag::Entity::find();

    if let Some(part) = non_empty(&filter.name_part) {
        select = select.filter(contains_ignore_case(tag::Column::Name, part));
    }
    if let Some(news_id) = filter.news_id {
        select = select.filter(
            tag::Column::Id.in_subquery(
                Query::select()
                    .column(news_tag::Column::TagId)
                    .from(news_tag::Entity)
                    .and_where(news_tag::Column::NewsId.eq(news_id))
                    .to_owned(),
            ),
        );
    }

    select.order_by_asc(tag::Column::Id)
}

pub fn compose_authors(filter: &AuthorFilter) -> Select<author::Entity> {
    let mut select = author::Entity::find();

    if let Some(part) = non_empty(&filter.name_part) {
        select = select.filter(contains_ignore_case(author::Column::Name, part));
    }

    select.order_by_asc(author::Column::Id)
}

/// Authors with the number of news articles they wrote, most productive first.
///
/// Selects the columns `author_id`, `author_name` and `news_count`. Authors
/// without news are listed with a count of zero.
pub fn compose_author_news_counts(filter: &AuthorFilter) -> Select<author::Entity> {
    let mut select = author::Entity::find()
        .select_only()
        .column_as(author::Column::Id, "author_id")
        .column_as(author::Column::Name, "author_name")
        .column_as(news::Column::Id.count(), "news_count")
        .join(JoinType::LeftJoin, author::Relation::News.def());

    if let Some(part) = non_empty(&filter.name_part) {
        select = select.filter(contains_ignore_case(author::Column::Name, part));
    }

    select
        .group_by(author::Column::Id)
        .group_by(author::Column::Name)
        .order_by_desc(news::Column::Id.count())
        .order_by_asc(author::Column::Id)
}

fn order_by_sort_key<E: EntityTrait>(
    select: Select<E>,
    sort: SortKey,
    created: E::Column,
    modified: E::Column,
    id: E::Column,
) -> Select<E> {
    let (column, order) = match sort {
        SortKey::CreatedAsc => (created, Order::Asc),
        SortKey::CreatedDesc => (created, Order::Desc),
        SortKey::ModifiedAsc => (modified, Order::Asc),
        SortKey::ModifiedDesc => (modified, Order::Desc),
    };
    select.order_by(column, order).order_by_asc(id)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// `LOWER(column) LIKE '%part%'` with the wildcards in `part` taken literally.
fn contains_ignore_case<C: ColumnTrait>(column: C, part: &str) -> SimpleExpr {
    let pattern = format!("%{}%", escape_like(&part.to_lowercase()));
    Expr::expr(Func::lower(Expr::col((column.entity_name(), column))))
        .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;

    fn sql<E: EntityTrait>(select: Select<E>) -> String {
        select.build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn escape_like_wildcards() {
        assert_eq!(escape_like("50%_off!"), "50!%!_off!!");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn no_filters_sorts_newest_first() {
        // Arrange
        let filter = NewsFilter::default();

        // Act
        let sql = sql(compose_news(&filter));

        // Assert
        assert!(!sql.contains("WHERE"), "{sql}");
        assert!(
            sql.ends_with(r#"ORDER BY "news"."created" DESC, "news"."id" ASC"#),
            "{sql}"
        );
    }

    #[test]
    fn each_sort_key_has_an_id_tie_break() {
        let cases = [
            (SortKey::CreatedAsc, r#""news"."created" ASC"#),
            (SortKey::CreatedDesc, r#""news"."created" DESC"#),
            (SortKey::ModifiedAsc, r#""news"."modified" ASC"#),
            (SortKey::ModifiedDesc, r#""news"."modified" DESC"#),
        ];
        for (sort, expected) in cases {
            let filter = NewsFilter::builder().sort(sort).build();

            let sql = sql(compose_news(&filter));

            assert!(
                sql.ends_with(&format!(r#"ORDER BY {expected}, "news"."id" ASC"#)),
                "{sql}"
            );
        }
    }

    #[test]
    fn substring_filters_ignore_case() {
        let filter = NewsFilter::builder()
            .title_part("Rust")
            .content_part("ASYNC")
            .build();

        let sql = sql(compose_news(&filter));

        assert!(sql.contains(r#"LOWER("news"."title") LIKE '%rust%'"#), "{sql}");
        assert!(sql.contains(r#"LOWER("news"."content") LIKE '%async%'"#), "{sql}");
        assert!(sql.contains(" AND "), "{sql}");
    }

    #[test]
    fn empty_strings_are_not_filters() {
        let filter = NewsFilter::builder().title_part("").author_name("").build();

        let sql = sql(compose_news(&filter));

        assert!(!sql.contains("WHERE"), "{sql}");
    }

    #[test]
    fn tag_membership_uses_a_subquery() {
        let filter = NewsFilter::builder().tag_ids(vec![3, 5]).build();

        let sql = sql(compose_news(&filter));

        assert!(
            sql.contains(r#""news"."id" IN (SELECT "news_id" FROM "news_tag" WHERE "news_tag"."tag_id" IN (3, 5))"#),
            "{sql}"
        );
    }

    #[test]
    fn tag_names_join_the_tag_table() {
        let filter = NewsFilter::builder()
            .tag_names(vec!["rust".to_string()])
            .build();

        let sql = sql(compose_news(&filter));

        assert!(sql.contains(r#"INNER JOIN "tag""#), "{sql}");
        assert!(sql.contains(r#""tag"."name" IN ('rust')"#), "{sql}");
    }

    #[test]
    fn author_filters() {
        let filter = NewsFilter::builder().author_id(7).author_name("Ann").build();

        let sql = sql(compose_news(&filter));

        assert!(sql.contains(r#""news"."author_id" = 7"#), "{sql}");
        assert!(
            sql.contains(r#""news"."author_id" IN (SELECT "id" FROM "author" WHERE "author"."name" = 'Ann')"#),
            "{sql}"
        );
    }

    #[test]
    fn comments_of_one_news_article() {
        let filter = CommentFilter::builder()
            .news_id(4)
            .sort(SortKey::ModifiedAsc)
            .build();

        let sql = sql(compose_comments(&filter));

        assert!(sql.contains(r#""comment"."news_id" = 4"#), "{sql}");
        assert!(
            sql.ends_with(r#"ORDER BY "comment"."modified" ASC, "comment"."id" ASC"#),
            "{sql}"
        );
    }

    #[test]
    fn tags_of_one_news_article() {
        let filter = TagFilter::builder().news_id(2).name_part("ne").build();

        let sql = sql(compose_tags(&filter));

        assert!(
            sql.contains(r#""tag"."id" IN (SELECT "tag_id" FROM "news_tag" WHERE "news_tag"."news_id" = 2)"#),
            "{sql}"
        );
        assert!(sql.contains(r#"LOWER("tag"."name") LIKE '%ne%'"#), "{sql}");
        assert!(sql.ends_with(r#"ORDER BY "tag"."id" ASC"#), "{sql}");
    }

    #[test]
    fn authors_by_name_part() {
        let filter = AuthorFilter::builder().name_part("li").build();

        let sql = sql(compose_authors(&filter));

        assert!(sql.contains(r#"LOWER("author"."name") LIKE '%li%'"#), "{sql}");
        assert!(sql.ends_with(r#"ORDER BY "author"."id" ASC"#), "{sql}");
    }

    #[test]
    fn news_counts_keep_authors_without_news() {
        let sql = sql(compose_author_news_counts(&AuthorFilter::default()));

        assert!(sql.contains(r#"COUNT("news"."id") AS "news_count""#), "{sql}");
        assert!(sql.contains(r#"LEFT JOIN "news""#), "{sql}");
        assert!(
            sql.ends_with(r#"ORDER BY COUNT("news"."id") DESC, "author"."id" ASC"#),
            "{sql}"
        );
    }
}
