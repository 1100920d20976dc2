use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use once_cell::sync::Lazy;
use prometheus::{Encoder, Opts, TextEncoder};
use crate::domain::Dimension;

/// Register additional metrics of our own structs by using this registry instance.
static REGISTRY: Lazy<Registry> = Lazy::new(|| Registry(prometheus::Registry::new()));

pub static FRIEND_REQUEST_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("friend_request", Opts::new("friend_requests_total", "count of created friend requests"))
});
pub static FRIEND_ACCEPT_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("friend_accept", Opts::new("friend_accepts_total", "count of accepted friend requests"))
});
pub static GIFT_COUNTER: Lazy<ComplexCommandCounters> = Lazy::new(|| {
    let opts = Opts::new("fish_gifts_total", "count of fish gift attempts and successes");
    ComplexCommandCounters {
        invoked: Counter::new("fish_gift (invoked)", opts.clone().const_label("state", "invoked")),
        finished: Counter::new("fish_gift (finished)", opts.const_label("state", "finished")),
    }
});
pub static SWEEP_NOTIFICATIONS_COUNTER: Lazy<DimensionCounters> = Lazy::new(|| {
    DimensionCounters::new("sweep_notification", Opts::new("sweep_notifications_total", "count of maintenance reminders sent by the sweeps"))
});
pub static SWEEP_FAILURES_COUNTER: Lazy<DimensionCounters> = Lazy::new(|| {
    DimensionCounters::new("sweep_failure", Opts::new("sweep_failures_total", "count of aquariums a sweep couldn't send a reminder for"))
});
pub static NOTIFIER_FAILURES_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("notifier_failure", Opts::new("notifier_failures_total", "count of notifications which couldn't be delivered"))
});


pub fn init() -> axum::Router {
    let prometheus = REGISTRY
        .register(&FRIEND_REQUEST_COUNTER)
        .register(&FRIEND_ACCEPT_COUNTER)
        .register(&GIFT_COUNTER.invoked)
        .register(&GIFT_COUNTER.finished)
        .register(&SWEEP_NOTIFICATIONS_COUNTER.feed)
        .register(&SWEEP_NOTIFICATIONS_COUNTER.water)
        .register(&SWEEP_NOTIFICATIONS_COUNTER.clean)
        .register(&SWEEP_FAILURES_COUNTER.feed)
        .register(&SWEEP_FAILURES_COUNTER.water)
        .register(&SWEEP_FAILURES_COUNTER.clean)
        .register(&NOTIFIER_FAILURES_COUNTER)
        .unwrap();

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
    axum::Router::new()
        .route("/metrics", get(|| async move {
            let mut buffer = vec![];
            let metrics = prometheus.gather();
            TextEncoder::new().encode(&metrics, &mut buffer).unwrap();
            let custom_metrics = String::from_utf8(buffer).unwrap();

            metric_handle.render() + custom_metrics.as_str()
        }))
        .layer(prometheus_layer)
}

pub struct Counter {
    inner: prometheus::Counter,
    name: String
}
pub struct ComplexCommandCounters {
    invoked: Counter,
    finished: Counter,
}
pub struct DimensionCounters {
    pub feed: Counter,
    pub water: Counter,
    pub clean: Counter,
}
struct Registry(prometheus::Registry);

impl Counter {
    fn new(name: &str, opts: Opts) -> Counter {
        let c = prometheus::Counter::with_opts(opts)
            .unwrap_or_else(|e| panic!("unable to create {name} counter: {e}"));
        Counter { inner: c, name: name.to_string() }
    }

    pub fn inc(&self) {
        self.inner.inc()
    }
}

impl ComplexCommandCounters {
    pub fn invoked(&self) {
        self.invoked.inc()
    }

    pub fn finished(&self) {
        self.finished.inc()
    }
}

impl DimensionCounters {
    fn new(name: &str, opts: Opts) -> Self {
        let counter = |dimension: &str| Counter::new(
            &format!("{name} ({dimension})"),
            opts.clone().const_label("dimension", dimension));
        Self {
            feed: counter("feed"),
            water: counter("water"),
            clean: counter("clean"),
        }
    }

    pub fn get(&self, dimension: Dimension) -> &Counter {
        match dimension {
            Dimension::Feed => &self.feed,
            Dimension::Water => &self.water,
            Dimension::Clean => &self.clean,
        }
    }
}

impl Registry {
    fn register(&self, counter: &Counter) -> &Self {
        self.0.register(Box::new(counter.inner.clone()))
            .unwrap_or_else(|e| panic!("unable to register the {} counter: {e}", counter.name));
        self
    }

    fn unwrap(&self) -> prometheus::Registry {
        self.0.clone()
    }
}
