pub mod position;
pub mod value;

pub use position::{col_from_label, col_to_label, Position, Size};
pub use value::{CellError, CellValue};
