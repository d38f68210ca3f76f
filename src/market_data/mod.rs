// Market data access: per-date CSV loading and time-indexed series views.

pub mod csv_loader;
pub mod series;

pub use csv_loader::{list_dates, load_option_quotes, load_option_trades, load_underlying};
pub use series::{
    get_symbol_frames, OptionQuoteSeries, OptionTradeSeries, UnderlyingFrame, UnderlyingSeries,
};
