use std::sync::Arc;
use std::time::Duration;

use kakijun_client::Endpoint;
use kakijun_config::Config;
use kakijun_core::render::{RenderedView, ViewMessage};
use kakijun_core::types::{AppEvent, UiEvent};
use kakijun_core::view::{Generation, MountId};
use kakijun_strokes::AnimationEvent;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::fake_api::{FakeApi, WATER_SVG, water_json};
use crate::controller::ChannelSet;
use crate::events::event_loop;
use crate::state::AppState;

struct Harness {
    ui_to_app_tx: AsyncSender<AppEvent>,
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
    task: JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    fn start(api: Arc<FakeApi>, config: Config) -> Self {
        let state = Arc::new(AppState::with_api(config, api));
        let channels = ChannelSet::new();
        let cancel = CancellationToken::new();

        let task = tokio::spawn(event_loop(
            state,
            channels.ui_to_app.1.clone(),
            channels.loopback(),
            channels.app_to_ui.0.clone(),
            cancel.clone(),
        ));

        Self {
            ui_to_app_tx: channels.ui_to_app.0.clone(),
            app_to_ui_rx: channels.app_to_ui.1.clone(),
            cancel,
            task,
        }
    }

    async fn search(&self, text: &str) {
        self.ui_to_app_tx
            .send(AppEvent::UiEvent(UiEvent::SearchText(text.into())))
            .await
            .expect("send failed");
    }

    async fn next(&self) -> AppEvent {
        timeout(Duration::from_secs(30), self.app_to_ui_rx.recv())
            .await
            .expect("Timeout - no event from the app")
            .expect("app channel closed")
    }

    /// Nothing arrives for a while
    async fn assert_quiet(&self) {
        if let Ok(event) = timeout(Duration::from_secs(10), self.app_to_ui_rx.recv()).await {
            panic!("unexpected event: {event:?}");
        }
    }

    async fn expect_view(&self) -> (Generation, RenderedView) {
        match self.next().await {
            AppEvent::ShowView { generation, view } => (generation, view),
            other => panic!("expected a view, got {other:?}"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn kanji_search_animates_strokes_one_at_a_time() {
    let api = FakeApi::new()
        .with_exact('水', water_json())
        .with_svg("06c34.svg", WATER_SVG)
        .build();
    let harness = Harness::start(api.clone(), Config::default());

    harness.search("水").await;

    let (generation, view) = harness.expect_view().await;
    assert_eq!(view, RenderedView::Message(ViewMessage::Searching));

    let (results_generation, view) = harness.expect_view().await;
    assert_eq!(results_generation, generation);
    let RenderedView::Cards(cards) = view else {
        panic!("expected cards, got {view:?}");
    };
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].character, "水");

    let mount_id = MountId::new(generation, 0);
    assert!(matches!(
        harness.next().await,
        AppEvent::DiagramLoaded { mount, ref diagram } if mount == mount_id && diagram.len() == 2
    ));

    let mut markers = Vec::new();
    loop {
        match harness.next().await {
            AppEvent::Animation { mount, event } => {
                assert_eq!(mount, mount_id);
                match event {
                    AnimationEvent::Frame { .. } => {}
                    AnimationEvent::LoopPause { .. } => {
                        markers.push(event);
                        break;
                    }
                    other => markers.push(other),
                }
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    assert_eq!(
        markers,
        vec![
            AnimationEvent::Reset { iteration: 0 },
            AnimationEvent::StrokeStarted { stroke: 0 },
            AnimationEvent::StrokeCompleted { stroke: 0 },
            AnimationEvent::StrokeStarted { stroke: 1 },
            AnimationEvent::StrokeCompleted { stroke: 1 },
            AnimationEvent::LoopPause { iteration: 0 },
        ]
    );

    // Loops back to fully hidden
    assert!(matches!(
        harness.next().await,
        AppEvent::Animation {
            event: AnimationEvent::Reset { iteration: 1 },
            ..
        }
    ));
    assert_eq!(api.requests(), vec![Endpoint::ExactMatch('水')]);
}

#[tokio::test(start_paused = true)]
async fn new_search_stops_previous_animation() {
    let api = FakeApi::new()
        .with_exact('水', water_json())
        .with_svg("06c34.svg", WATER_SVG)
        .build();
    let harness = Harness::start(api.clone(), Config::default());

    harness.search("水").await;
    let (first, _) = harness.expect_view().await;
    harness.expect_view().await;
    // Wait until the animation is running
    loop {
        if let AppEvent::Animation {
            event: AnimationEvent::StrokeStarted { .. },
            ..
        } = harness.next().await
        {
            break;
        }
    }

    harness.search("ocean").await;

    let second = loop {
        match harness.next().await {
            AppEvent::ShowView {
                generation,
                view: RenderedView::Message(ViewMessage::NoResults { query }),
            } => {
                assert_eq!(query, "ocean");
                break generation;
            }
            AppEvent::ShowView { generation, view } => {
                assert!(generation > first);
                assert_eq!(view, RenderedView::Message(ViewMessage::Searching));
            }
            AppEvent::Animation { mount, .. } => assert_eq!(mount.generation, first),
            other => panic!("unexpected event: {other:?}"),
        }
    };

    assert!(second > first);
    harness.assert_quiet().await;
    assert_eq!(
        api.requests(),
        vec![Endpoint::ExactMatch('水'), Endpoint::Search("ocean".into())]
    );
}

#[tokio::test(start_paused = true)]
async fn superseded_search_never_shows_results() {
    let api = FakeApi::new()
        .with_exact('水', water_json())
        .with_latency(Duration::from_secs(2))
        .build();
    let harness = Harness::start(api.clone(), Config::default());

    harness.search("水").await;
    let (first, _) = harness.expect_view().await;
    harness.search("ocean").await;

    let (second, view) = harness.expect_view().await;
    assert!(second > first);
    assert_eq!(view, RenderedView::Message(ViewMessage::Searching));

    let (generation, view) = harness.expect_view().await;
    assert_eq!(generation, second);
    assert_eq!(
        view,
        RenderedView::Message(ViewMessage::NoResults {
            query: "ocean".into()
        })
    );
    harness.assert_quiet().await;
}

#[tokio::test(start_paused = true)]
async fn missing_svg_shows_unavailable_without_animation() {
    let api = FakeApi::new().with_exact('水', water_json()).build();
    let harness = Harness::start(api, Config::default());

    harness.search("水").await;
    let (generation, _) = harness.expect_view().await;
    harness.expect_view().await;

    assert!(matches!(
        harness.next().await,
        AppEvent::DiagramUnavailable { mount } if mount == MountId::new(generation, 0)
    ));
    harness.assert_quiet().await;
}

#[tokio::test]
async fn blank_search_makes_no_request() {
    let api = FakeApi::new().build();
    let harness = Harness::start(api.clone(), Config::default());

    harness.search("   ").await;

    let (_, view) = harness.expect_view().await;
    assert_eq!(view, RenderedView::Message(ViewMessage::EmptyQuery));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn close_ends_the_loop() {
    let harness = Harness::start(FakeApi::new().build(), Config::default());

    harness
        .ui_to_app_tx
        .send(AppEvent::UiEvent(UiEvent::Close))
        .await
        .unwrap();

    let result = timeout(Duration::from_secs(2), harness.task).await;
    assert!(matches!(result, Ok(Ok(Ok(())))));
}

#[tokio::test]
async fn cancellation_ends_the_loop() {
    let harness = Harness::start(FakeApi::new().build(), Config::default());

    harness.cancel.cancel();

    let result = timeout(Duration::from_secs(2), harness.task).await;
    assert!(matches!(result, Ok(Ok(Ok(())))));
}
