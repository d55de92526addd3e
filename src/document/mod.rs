pub mod conversion;
pub mod definition;
pub mod reactflow;

pub use conversion::*;
pub use definition::*;
pub use reactflow::ReactFlowExport;
