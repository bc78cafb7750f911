// Serving path: registry -> artifact -> live candle -> prediction
pub mod inference_service;

// Offline training and the model it produces
pub mod ml;
