// Unit test modules

mod config {
    mod test_constants;
}

mod market_data {
    mod test_csv_loader;
    mod test_series;
}

mod pricing {
    mod test_price_at;
}

mod analysis {
    mod test_divergence;
    mod test_spread_series;
}

mod strategies {
    mod test_pnl_grid;
    mod test_position_builder;
    mod test_properties;
    mod test_rankings;
    mod test_scanner;
}

mod broker {
    mod test_mock_broker;
}
