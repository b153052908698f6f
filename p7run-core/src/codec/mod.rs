mod parameters;
mod results;

pub use parameters::{encode_parameters, Inputs};
pub use results::{decode_output, decode_results, OutputValue, Outputs};
