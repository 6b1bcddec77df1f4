use instrument_chart::data::{FixtureData, FixtureProvider, InstrumentHistory, fulfil};
use instrument_chart::domain::{DatedPoint, InstrumentInfo, OhlcPoint, Transaction, TransactionKind};
use instrument_chart::engine::FetchReason;
use instrument_chart::models::{
    Axis, CrossRateEdge, IndicatorKind, RecordingSurface, RefusalReason, ToggleOutcome, Trace,
};
use instrument_chart::{
    ChartNotice, ChartSession, ChartType, DisplayMode, InstrumentSelection, MemorySettingsStore,
    RenderSurface, SessionUpdate,
};

fn info(id: &str, name: &str, currency: &str) -> InstrumentInfo {
    InstrumentInfo {
        id: id.into(),
        name: name.into(),
        currency: currency.into(),
    }
}

fn february() -> Vec<String> {
    (1..=28).map(|d| format!("2024-02-{:02}", d)).collect()
}

fn priced(dates: &[String], start: f64) -> Vec<DatedPoint> {
    dates
        .iter()
        .enumerate()
        .map(|(i, d)| DatedPoint::new(d.clone(), Some(start + (i % 7) as f64)))
        .collect()
}

fn rate_series(dates: &[String], rate: f64) -> Vec<DatedPoint> {
    dates.iter().map(|d| DatedPoint::new(d.clone(), Some(rate))).collect()
}

fn fixture() -> FixtureProvider {
    let days = february();
    let acme_prices = priced(&days, 100.0);
    let acme_ohlc = acme_prices
        .iter()
        .map(|p| OhlcPoint {
            date: p.date.clone(),
            open: p.close.map(|c| c - 0.5),
            high: p.close.map(|c| c + 1.0),
            low: p.close.map(|c| c - 1.0),
            close: p.close,
            volume: Some(1_000.0),
        })
        .collect();

    FixtureProvider::new(FixtureData {
        main_currency: "CHF".into(),
        instruments: vec![
            InstrumentHistory {
                info: info("ACME", "Acme Corp", "USD"),
                prices: acme_prices,
                ohlc: Some(acme_ohlc),
                transactions: vec![
                    Transaction {
                        date: "2024-01-15".into(),
                        kind: TransactionKind::Buy,
                        quantity: 10.0,
                        unit_price: 95.0,
                    },
                    Transaction {
                        date: "2024-02-10".into(),
                        kind: TransactionKind::Sell,
                        quantity: 4.0,
                        unit_price: 103.0,
                    },
                    Transaction {
                        date: "2024-02-20".into(),
                        kind: TransactionKind::Dividend,
                        quantity: 6.0,
                        unit_price: 0.5,
                    },
                ],
            },
            InstrumentHistory {
                info: info("BETA", "Beta AG", "EUR"),
                prices: priced(&days, 50.0),
                ohlc: None,
                transactions: Vec::new(),
            },
        ],
        cross_rates: vec![
            CrossRateEdge::new("CHF", "USD", rate_series(&days, 0.9)).unwrap(),
            CrossRateEdge::new("CHF", "EUR", rate_series(&days, 0.95)).unwrap(),
        ],
    })
    .unwrap()
}

fn session() -> ChartSession<RecordingSurface> {
    ChartSession::new(RecordingSurface::new(), Box::new(MemorySettingsStore::new()))
}

async fn load(
    session: &mut ChartSession<RecordingSurface>,
    provider: &FixtureProvider,
    ids: &[&str],
) -> SessionUpdate {
    let selections = ids.iter().map(|id| InstrumentSelection::new(*id)).collect();
    let request = session.prepare_chart(selections).unwrap();
    let response = fulfil(&request, provider, provider).await.unwrap();
    session.apply_response(request.ticket, response).unwrap()
}

fn line<'a>(session: &'a ChartSession<RecordingSurface>, name: &str) -> &'a instrument_chart::models::LineTrace {
    let position = session.surface().position_of(name).unwrap();
    match &session.surface().traces[position] {
        Trace::Line(line) => line,
        other => panic!("{} is a {}", name, other.kind_label()),
    }
}

#[tokio::test]
async fn two_hop_conversion_through_main_currency() {
    let days = vec!["2024-01-02".to_string()];
    let provider = FixtureProvider::new(FixtureData {
        main_currency: "CHF".into(),
        instruments: vec![InstrumentHistory {
            info: info("ACME", "Acme Corp", "USD"),
            prices: vec![DatedPoint::new("20240102", Some(100.0))],
            ohlc: None,
            transactions: Vec::new(),
        }],
        cross_rates: vec![
            CrossRateEdge::new("CHF", "USD", rate_series(&days, 1.1)).unwrap(),
            CrossRateEdge::new("CHF", "EUR", rate_series(&days, 0.95)).unwrap(),
        ],
    })
    .unwrap();

    let mut s = session();
    assert_eq!(s.set_display_currency("EUR"), SessionUpdate::Unchanged);
    assert_eq!(load(&mut s, &provider, &["ACME"]).await, SessionUpdate::Replotted);

    let price = line(&s, "Acme Corp (EUR)");
    assert_eq!(price.dates, vec!["2024-01-02"]);
    assert!((price.values[0].unwrap() - 100.0 * 1.1 / 0.95).abs() < 1e-9);
    assert!(s.notices().is_empty());
}

#[tokio::test]
async fn unreachable_currency_falls_back_to_raw_prices_with_notice() {
    let provider = fixture();
    let mut s = session();
    s.set_display_currency("JPY");
    load(&mut s, &provider, &["ACME"]).await;

    let price = line(&s, "Acme Corp (USD)");
    assert_eq!(price.values[0], Some(100.0));
    assert_eq!(
        s.notices(),
        &[ChartNotice::Unconverted {
            instrument_id: "ACME".into(),
            requested: "JPY".into(),
            shown_currency: "USD".into(),
        }]
    );
}

#[tokio::test]
async fn single_instrument_candles_markers_and_holding() {
    let provider = fixture();
    let mut s = session();
    s.set_chart_type(ChartType::Candlestick);
    load(&mut s, &provider, &["ACME"]).await;

    let kinds: Vec<&str> = s.surface().traces.iter().map(Trace::kind_label).collect();
    assert_eq!(kinds, vec!["candlestick", "marker", "marker", "step"]);
    assert!(s.layout().holding_axis);

    let holding = line(&s, "Acme Corp holding");
    assert_eq!(holding.axis, Axis::Holding);
    // bought before the window, sold part of it inside
    assert_eq!(holding.values.first(), Some(&Some(10.0)));
    assert_eq!(holding.values.last(), Some(&Some(6.0)));
}

#[tokio::test]
async fn two_instruments_plot_lines_and_refuse_oscillators() {
    let provider = fixture();
    let mut s = session();
    s.set_chart_type(ChartType::Ohlc);
    load(&mut s, &provider, &["ACME", "BETA"]).await;

    assert!(s.registry().is_multi_instrument());
    assert!(s.surface().traces.iter().all(|t| !matches!(t, Trace::Ohlc(_) | Trace::Candlestick(_))));
    assert!(!s.layout().holding_axis);

    assert_eq!(
        s.toggle_indicator(IndicatorKind::Rsi),
        ToggleOutcome::Refused(RefusalReason::MultiInstrumentMode)
    );
    assert!(matches!(s.toggle_indicator(IndicatorKind::Sma), ToggleOutcome::Shown(_)));
}

#[tokio::test]
async fn superseded_fetch_is_dropped() {
    let provider = fixture();
    let mut s = session();

    let first = s.prepare_chart(vec![InstrumentSelection::new("ACME")]).unwrap();
    let SessionUpdate::Fetch(second) = s.set_display_currency("EUR") else {
        panic!("changing currency mid-load should refetch")
    };
    assert_eq!(second.currencies, vec!["EUR".to_string()]);

    let late = fulfil(&first, &provider, &provider).await.unwrap();
    let current = fulfil(&second, &provider, &provider).await.unwrap();

    assert_eq!(s.apply_response(second.ticket, current).unwrap(), SessionUpdate::Replotted);
    assert_eq!(s.apply_response(first.ticket, late).unwrap(), SessionUpdate::Stale);
    assert_eq!(s.stale_responses(), 1);
    assert_eq!(s.loaded()[0].display_currency(), "EUR");
}

#[tokio::test]
async fn currency_switch_keeps_rates_for_the_whole_loaded_range() {
    let provider = fixture();
    let mut s = session();
    s.set_display_currency("CHF");
    load(&mut s, &provider, &["ACME"]).await;
    assert_eq!(s.set_window_start(Some("2024-02-10")).unwrap(), SessionUpdate::Replotted);

    let SessionUpdate::Fetch(rates) = s.set_display_currency("EUR") else {
        panic!("no CHF/EUR rates held yet")
    };
    assert!(!rates.wants_instruments());
    assert_eq!(rates.from, None);
    let response = fulfil(&rates, &provider, &provider).await.unwrap();
    s.apply_response(rates.ticket, response).unwrap();

    assert_eq!(s.set_window_start(Some("2024-02-01")).unwrap(), SessionUpdate::Replotted);
    let eur = line(&s, "Acme Corp (EUR)");
    assert_eq!(eur.dates.len(), 28);
    assert_eq!(eur.dates[0], "2024-02-01");

    assert_eq!(s.set_display_currency("CHF"), SessionUpdate::Replotted);
    assert_eq!(line(&s, "Acme Corp (CHF)").dates.len(), 28);
}

#[tokio::test]
async fn currency_switch_during_window_extension_still_loads_earlier_prices() {
    let provider = fixture();
    let mut s = session();
    s.set_window_start(Some("2024-02-10")).unwrap();
    load(&mut s, &provider, &["ACME"]).await;
    assert_eq!(s.loaded()[0].window().len(), 19);

    let SessionUpdate::Fetch(extension) = s.set_window_start(Some("2024-02-01")).unwrap() else {
        panic!("earlier window needs earlier prices")
    };
    let SessionUpdate::Fetch(widened) = s.set_display_currency("EUR") else {
        panic!("currency change during a reload should refetch")
    };
    assert_eq!(widened.reason, FetchReason::WindowExtension);
    assert!(widened.wants_instruments());
    assert_eq!(widened.from.as_deref(), Some("2024-02-01"));
    assert!(widened.currencies.contains(&"EUR".to_string()));

    let late = fulfil(&extension, &provider, &provider).await.unwrap();
    let current = fulfil(&widened, &provider, &provider).await.unwrap();
    assert_eq!(s.apply_response(extension.ticket, late).unwrap(), SessionUpdate::Stale);
    assert_eq!(s.apply_response(widened.ticket, current).unwrap(), SessionUpdate::Replotted);

    let eur = line(&s, "Acme Corp (EUR)");
    assert_eq!(eur.dates.len(), 28);
    assert_eq!(eur.dates[0], "2024-02-01");
    assert_eq!(s.set_window_start(Some("2024-02-01")).unwrap(), SessionUpdate::Unchanged);
}

#[tokio::test]
async fn indicators_follow_the_window_across_replots() {
    let provider = fixture();
    let mut s = session();
    load(&mut s, &provider, &["ACME"]).await;
    let base = s.surface().trace_count();

    assert_eq!(s.toggle_indicator(IndicatorKind::Ema), ToggleOutcome::Shown(vec![base]));
    assert_eq!(s.set_window_start(Some("2024-02-15")).unwrap(), SessionUpdate::Replotted);

    let ema_at = s.registry().state(IndicatorKind::Ema).trace_indices.clone();
    assert_eq!(ema_at.len(), 1);
    let ema = &s.surface().traces[ema_at[0]];
    assert!(ema.name().starts_with("EMA"));
    assert_eq!(ema.point_count(), 14);
}

#[tokio::test]
async fn hiding_out_of_order_keeps_every_other_indicator_addressable() {
    let provider = fixture();
    let mut s = session();
    load(&mut s, &provider, &["ACME"]).await;

    for kind in [IndicatorKind::Sma, IndicatorKind::Bollinger, IndicatorKind::Ema, IndicatorKind::Rsi] {
        assert!(matches!(s.toggle_indicator(kind), ToggleOutcome::Shown(_)));
    }
    assert!(s.layout().oscillator_subplot);

    assert_eq!(s.toggle_indicator(IndicatorKind::Bollinger), ToggleOutcome::Hidden);
    for (kind, prefix) in [
        (IndicatorKind::Sma, "SMA"),
        (IndicatorKind::Ema, "EMA"),
        (IndicatorKind::Rsi, "RSI"),
    ] {
        let at = &s.registry().state(kind).trace_indices;
        assert_eq!(at.len(), 1);
        assert!(s.surface().traces[at[0]].name().starts_with(prefix));
    }
}

#[tokio::test]
async fn percent_mode_rebases_to_one_hundred() {
    let provider = fixture();
    let mut s = session();
    s.set_display_mode(DisplayMode::PercentFromStart);
    load(&mut s, &provider, &["ACME"]).await;

    let price = line(&s, "Acme Corp (USD)");
    assert!((price.values[0].unwrap() - 100.0).abs() < 1e-9);
    // 2024-02-02 closes at 101 against a 100 start
    assert!((price.values[1].unwrap() - 101.0).abs() < 1e-9);
    assert_eq!(s.layout().y_axis_title, "%");
}
