use anyhow::Result;
use async_trait::async_trait;
use meterwatch::application::system::Application;
use meterwatch::config::{Config, PollConfig, SlsConfig, YdappConfig};
use meterwatch::domain::metric::MetricEntry;
use meterwatch::domain::ports::{BalanceSource, LogStore};
use meterwatch::infrastructure::observability::Metrics;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

const ROOM: i64 = 4321;

// Balance source that replays a script and requests shutdown once it runs dry
struct ScriptedSource {
    room_id: i64,
    script: Mutex<VecDeque<Result<f64, String>>>,
    stop_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<f64, String>>) -> (Arc<Self>, oneshot::Receiver<()>) {
        Self::for_room(ROOM, script)
    }

    fn for_room(
        room_id: i64,
        script: Vec<Result<f64, String>>,
    ) -> (Arc<Self>, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let source = Arc::new(Self {
            room_id,
            script: Mutex::new(script.into()),
            stop_tx: Mutex::new(Some(tx)),
        });
        (source, rx)
    }
}

#[async_trait]
impl BalanceSource for ScriptedSource {
    async fn read_balance(&self, room_id: i64) -> Result<f64> {
        assert_eq!(room_id, self.room_id);
        let next = {
            let mut script = self.script.lock().unwrap();
            let next = script.pop_front();
            if script.is_empty()
                && let Some(tx) = self.stop_tx.lock().unwrap().take()
            {
                let _ = tx.send(());
            }
            next
        };

        match next {
            Some(Ok(balance)) => Ok(balance),
            Some(Err(msg)) => anyhow::bail!(msg),
            None => anyhow::bail!("script exhausted"),
        }
    }
}

#[derive(Default)]
struct RecordingStore {
    batches: Mutex<Vec<Vec<MetricEntry>>>,
    fail: bool,
}

impl RecordingStore {
    fn failing() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }

    fn values(&self) -> Vec<String> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|e| e.value().to_string())
            .collect()
    }
}

#[async_trait]
impl LogStore for RecordingStore {
    async fn put_entries(&self, entries: &[MetricEntry]) -> Result<()> {
        if self.fail {
            anyhow::bail!("log store unavailable");
        }
        self.batches.lock().unwrap().push(entries.to_vec());
        Ok(())
    }
}

fn test_config() -> Config {
    Config {
        ydapp: YdappConfig {
            openid: "oTest123".to_string(),
            room_id: ROOM,
            base_url: "http://127.0.0.1:9".to_string(),
        },
        sls: SlsConfig {
            access_key_id: "akid".to_string(),
            access_key_secret: "secret".to_string(),
            endpoint: "http://127.0.0.1:9".to_string(),
            project: "campus".to_string(),
            store: "meter".to_string(),
            compress: true,
        },
        poll: PollConfig {
            interval: Duration::from_millis(5),
            metric_name: "ac_meter_balance".to_string(),
        },
    }
}

#[tokio::test]
async fn test_failed_cycle_does_not_stop_the_loop() {
    let (source, stop_rx) = ScriptedSource::new(vec![
        Ok(10.0),
        Err("upstream returned 500".to_string()),
        Ok(9.5),
    ]);
    let store = Arc::new(RecordingStore::default());
    let metrics = Metrics::new().unwrap();
    let app = Application::with_services(&test_config(), source, store.clone(), metrics.clone());

    app.run_until(async {
        let _ = stop_rx.await;
    })
    .await
    .unwrap();

    assert_eq!(store.batch_sizes(), [2]);
    assert_eq!(store.values(), ["10.0", "9.5"]);
    assert_eq!(metrics.polls_total.with_label_values(&["ok"]).get(), 2.0);
    assert_eq!(metrics.polls_total.with_label_values(&["error"]).get(), 1.0);
    assert_eq!(metrics.meter_balance.get(), 9.5);
}

#[tokio::test]
async fn test_threshold_flush_then_final_drain() {
    let script = (0..12).map(|i| Ok(100.0 - i as f64)).collect();
    let (source, stop_rx) = ScriptedSource::new(script);
    let store = Arc::new(RecordingStore::default());
    let metrics = Metrics::new().unwrap();
    let app = Application::with_services(&test_config(), source, store.clone(), metrics.clone());

    app.run_until(async {
        let _ = stop_rx.await;
    })
    .await
    .unwrap();

    assert_eq!(store.batch_sizes(), [10, 2]);
    assert_eq!(store.values().first().map(String::as_str), Some("100.0"));
    assert_eq!(store.values().last().map(String::as_str), Some("89.0"));
    assert_eq!(metrics.points_flushed_total.get(), 12);
}

#[tokio::test]
async fn test_labels_carry_room_id() {
    let (source, _stop_rx) = ScriptedSource::new(vec![Ok(12.5)]);
    let store = Arc::new(RecordingStore::default());
    let app = Application::with_services(
        &test_config(),
        source,
        store.clone(),
        Metrics::new().unwrap(),
    );

    let reading = app.run_once().await.unwrap();

    assert_eq!(reading.room_id, ROOM);
    assert_eq!(reading.balance, 12.5);
    assert!(reading.observed_at <= chrono::Utc::now());
    let batches = store.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].name(), "ac_meter_balance");
    assert_eq!(batches[0][0].labels(), "room_id#$#4321");
}

#[tokio::test]
async fn test_zero_room_id_is_left_out_of_labels() {
    let (source, _stop_rx) = ScriptedSource::for_room(0, vec![Ok(10.0)]);
    let store = Arc::new(RecordingStore::default());
    let mut config = test_config();
    config.ydapp.room_id = 0;
    let app = Application::with_services(&config, source, store.clone(), Metrics::new().unwrap());

    app.run_once().await.unwrap();

    let batches = store.batches.lock().unwrap();
    assert_eq!(batches[0][0].labels(), "");
    assert_eq!(batches[0][0].value(), "10.0");
}

#[tokio::test]
async fn test_failed_final_flush_is_reported() {
    let (source, stop_rx) = ScriptedSource::new(vec![Ok(1.0), Ok(2.0)]);
    let store = Arc::new(RecordingStore::failing());
    let metrics = Metrics::new().unwrap();
    let app = Application::with_services(&test_config(), source, store, metrics.clone());

    let result = app
        .run_until(async {
            let _ = stop_rx.await;
        })
        .await;

    assert!(result.is_err());
    assert_eq!(metrics.flush_failures_total.get(), 1);
}

#[tokio::test]
async fn test_run_once_surfaces_read_failure_after_draining() {
    let (source, _stop_rx) = ScriptedSource::new(vec![Err("timeout".to_string())]);
    let store = Arc::new(RecordingStore::default());
    let app = Application::with_services(
        &test_config(),
        source,
        store.clone(),
        Metrics::new().unwrap(),
    );

    let result = app.run_once().await;

    assert!(result.is_err());
    assert!(store.batch_sizes().is_empty());
}
