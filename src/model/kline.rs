/// One closed or still-forming bar from the kline REST endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Kline {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub open_time: u64,
    pub close_time: u64,
}

/// Single close sample pushed by the kline stream for the bar opened at `open_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct KlineSample {
    pub pair: String,
    pub interval: String,
    pub open_time: u64,
    pub close: f64,
    pub is_closed: bool,
}
