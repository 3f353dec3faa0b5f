pub mod html;
pub mod projection;

pub use html::{ChartRenderer, HtmlRenderer};
pub use projection::{project, ChartEdge, ChartNode, ChartProjection};
