pub mod border;
pub mod datasheet;
pub mod dimension;
pub mod font;
pub mod stylesheet;
pub mod text;

pub use border::Border;
pub use datasheet::{class, palette};
pub use dimension::{Margins, PageSize};
pub use font::FontWeight;
pub use stylesheet::{ComputedStyle, ElementStyle, PageLayout, Stylesheet};
pub use text::TextAlign;
