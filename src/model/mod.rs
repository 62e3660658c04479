pub mod coin;
pub mod kline;
pub mod quote_buffer;
