mod post;
mod tag;

pub use post::Post;
pub use tag::Tag;
