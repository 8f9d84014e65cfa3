// Domain 層：核心模型與 ports（介面），實際 I/O 放在 adapters

pub mod model;
pub mod ports;
