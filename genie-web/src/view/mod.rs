pub mod markdown;
pub mod model;
pub mod templates;

pub use model::{ViewState, WidgetView};
pub use templates::Templates;
