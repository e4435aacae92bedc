mod constant;
mod param_gen;
mod random;

pub use constant::ConstParamGen;
pub use param_gen::{Fan, ParamGen};
pub use random::RandParamGen;
