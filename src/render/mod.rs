pub mod colormap;
pub mod overlay;

pub use colormap::{Colormap, ColormapParseError, Palette, Rgb};
pub use overlay::{Overlay, contour_mask, render_overlay};
