use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use search_client::{SearchResponse, SearchResult, StockRecord, StockSearch};
use tokio::sync::mpsc;

use crate::dashboard::{Dashboard, RefreshTicket, SearchTicket};

/// Outcome of a background request, delivered back to the UI loop.
#[derive(Debug)]
pub enum AppMessage {
    Search(SearchTicket, SearchResult<SearchResponse>),
    Refresh(RefreshTicket, SearchResult<StockRecord>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Query,
    Results,
}

pub struct App {
    pub dashboard: Dashboard,
    pub focus: Focus,
    pub should_quit: bool,
    backend: Arc<dyn StockSearch>,
    tx: mpsc::UnboundedSender<AppMessage>,
    rx: mpsc::UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(backend: Arc<dyn StockSearch>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            dashboard: Dashboard::new(),
            focus: Focus::Query,
            should_quit: false,
            backend,
            tx,
            rx,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.focus {
            Focus::Query => match key.code {
                KeyCode::Enter => self.submit(),
                KeyCode::Backspace => self.dashboard.pop_char(),
                KeyCode::Tab | KeyCode::Down => self.focus = Focus::Results,
                KeyCode::Esc => self.should_quit = true,
                KeyCode::Char(c) => self.dashboard.push_char(c),
                _ => {}
            },
            Focus::Results => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.dashboard.select_prev(),
                KeyCode::Down | KeyCode::Char('j') => self.dashboard.select_next(),
                KeyCode::Enter | KeyCode::Char(' ') => self.dashboard.toggle_selected(),
                KeyCode::Char('r') => self.refresh_selected(),
                KeyCode::Tab | KeyCode::Char('/') => self.focus = Focus::Query,
                KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            },
        }
    }

    /// Issue a search for the current query unless one is already running.
    pub fn submit(&mut self) {
        let Some((ticket, query)) = self.dashboard.submit() else {
            return;
        };

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.search(&query).await;
            match &result {
                Ok(resp) => tracing::info!(query = %query, results = resp.results.len(), "Search completed"),
                Err(e) => tracing::warn!(query = %query, kind = e.kind(), "Search failed: {}", e),
            }
            let _ = tx.send(AppMessage::Search(ticket, result));
        });
    }

    pub fn refresh_selected(&mut self) {
        let Some(ticket) = self.dashboard.begin_refresh() else {
            return;
        };

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.get_details(&ticket.key.symbol).await;
            if let Err(e) = &result {
                tracing::warn!(symbol = %ticket.key.symbol, kind = e.kind(), "Refresh failed: {}", e);
            }
            let _ = tx.send(AppMessage::Refresh(ticket, result));
        });
    }

    pub fn apply(&mut self, message: AppMessage) {
        let applied = match message {
            AppMessage::Search(ticket, result) => self.dashboard.complete(ticket, result),
            AppMessage::Refresh(ticket, result) => self.dashboard.complete_refresh(ticket, result),
        };
        if !applied {
            tracing::debug!("Dropped a superseded response");
        }
    }

    /// Apply every message that has already arrived.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.apply(message);
            count += 1;
        }
        count
    }

    /// Wait for the next message without applying it.
    pub async fn recv(&mut self) -> Option<AppMessage> {
        self.rx.recv().await
    }

    /// Wait for the next message and apply it.
    pub async fn next_message(&mut self) -> bool {
        match self.recv().await {
            Some(message) => {
                self.apply(message);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Status;
    use async_trait::async_trait;
    use search_client::SearchError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// In-memory backend. Searches wait on `gate` so tests can observe the
    /// loading state.
    #[derive(Default)]
    struct FakeBackend {
        searches: AtomicUsize,
        queries: Mutex<Vec<String>>,
        gate: Notify,
        fail_with: Mutex<Option<String>>,
    }

    #[async_trait]
    impl StockSearch for FakeBackend {
        async fn search(&self, query: &str) -> SearchResult<SearchResponse> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            self.gate.notified().await;

            if let Some(msg) = self.fail_with.lock().unwrap().clone() {
                return Err(SearchError::Application(msg));
            }
            Ok(SearchResponse {
                results: vec![StockRecord::new("AAPL"), StockRecord::new("MSFT")],
            })
        }

        async fn get_details(&self, symbol: &str) -> SearchResult<StockRecord> {
            let mut record = StockRecord::new(symbol);
            record.current_price = Some(101.0);
            Ok(record)
        }

        fn backend_name(&self) -> &'static str {
            "fake"
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_query(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn test_repeated_enter_issues_one_request() {
        let backend = Arc::new(FakeBackend::default());
        let mut app = App::new(backend.clone());

        type_query(&mut app, "tech stocks");
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.dashboard.status(), Status::Loading);

        tokio::task::yield_now().await;
        backend.gate.notify_one();
        assert!(app.next_message().await);

        assert_eq!(backend.searches.load(Ordering::SeqCst), 1);
        assert_eq!(*backend.queries.lock().unwrap(), vec!["tech stocks".to_string()]);
        assert_eq!(app.dashboard.status(), Status::Showing(2));
    }

    #[tokio::test]
    async fn test_blank_query_never_reaches_backend() {
        let backend = Arc::new(FakeBackend::default());
        let mut app = App::new(backend.clone());

        type_query(&mut app, "   ");
        app.handle_key(key(KeyCode::Enter));
        tokio::task::yield_now().await;

        assert_eq!(backend.searches.load(Ordering::SeqCst), 0);
        assert_eq!(app.dashboard.status(), Status::Idle);
        assert_eq!(app.drain(), 0);
    }

    #[tokio::test]
    async fn test_application_error_is_shown() {
        let backend = Arc::new(FakeBackend::default());
        *backend.fail_with.lock().unwrap() = Some("LLM unavailable".to_string());
        let mut app = App::new(backend.clone());

        type_query(&mut app, "anything");
        app.handle_key(key(KeyCode::Enter));
        backend.gate.notify_one();
        app.next_message().await;

        assert_eq!(app.dashboard.status(), Status::Failed("LLM unavailable"));
        assert!(!app.dashboard.is_loading());
    }

    #[tokio::test]
    async fn test_results_keys_toggle_and_refresh() {
        let backend = Arc::new(FakeBackend::default());
        let mut app = App::new(backend.clone());

        type_query(&mut app, "big tech");
        app.handle_key(key(KeyCode::Enter));
        backend.gate.notify_one();
        app.next_message().await;

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Results);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char(' ')));
        let expanded: Vec<bool> = app.dashboard.cards().iter().map(|c| c.expanded).collect();
        assert_eq!(expanded, vec![false, true]);

        app.handle_key(key(KeyCode::Char('r')));
        app.next_message().await;
        assert_eq!(app.dashboard.cards()[1].record.current_price, Some(101.0));
        assert!(app.dashboard.cards()[1].expanded);
    }

    #[tokio::test]
    async fn test_recv_leaves_applying_to_caller() {
        let backend = Arc::new(FakeBackend::default());
        let mut app = App::new(backend.clone());

        type_query(&mut app, "banks");
        app.handle_key(key(KeyCode::Enter));
        backend.gate.notify_one();

        let message = app.recv().await.unwrap();
        assert!(matches!(message, AppMessage::Search(..)));
        assert_eq!(app.dashboard.status(), Status::Loading);

        app.apply(message);
        assert_eq!(app.dashboard.status(), Status::Showing(2));
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = App::new(Arc::new(FakeBackend::default()));
        type_query(&mut app, "q");
        assert!(!app.should_quit);
        assert_eq!(app.dashboard.query(), "q");

        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert_eq!(app.backend_name(), "fake");
    }
}
