//! Concrete lifecycle plugins.

mod clean;
mod copy;
mod extract;
mod manifest_emit;
mod provide;
mod template;

pub use clean::CleanPlugin;
pub use copy::{VendorCopy, VendorCopyPlugin};
pub use extract::CssExtractPlugin;
pub use manifest_emit::ManifestEmitPlugin;
pub use provide::ProvidePlugin;
pub use template::TemplatePlugin;
