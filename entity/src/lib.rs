pub mod author;
pub mod comment;
pub mod news;
pub mod news_tag;
pub mod tag;

pub static AUTHOR_NAME_MAX_LEN: u32 = 15;
pub static TAG_NAME_MAX_LEN: u32 = 15;
pub static NEWS_TITLE_MAX_LEN: u32 = 100;
pub static COMMENT_CONTENT_MAX_LEN: u32 = 255;

