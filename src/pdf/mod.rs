pub mod invoice;

pub use invoice::render_invoice;
