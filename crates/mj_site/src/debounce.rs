use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Input events of the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchInput {
    Keystroke(String),
    Enter,
    Escape,
}

/// Debounce state machine with the clock passed in.
///
/// A keystroke (re)arms the deadline; only the query present when the
/// deadline passes fires. Enter and Escape fire at once and disarm.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    query: String,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            query: String::new(),
            deadline: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn keystroke(&mut self, query: impl Into<String>, now: Instant) {
        self.query = query.into();
        self.deadline = Some(now + self.delay);
    }

    pub fn enter(&mut self) -> String {
        self.deadline = None;
        self.query.clone()
    }

    pub fn escape(&mut self) -> String {
        self.deadline = None;
        self.query.clear();
        String::new()
    }

    /// Returns the query to run if the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(self.query.clone())
            }
            _ => None,
        }
    }

    /// Feed one input event; returns a query when it fires immediately.
    pub fn handle(&mut self, input: SearchInput, now: Instant) -> Option<String> {
        match input {
            SearchInput::Keystroke(query) => {
                self.keystroke(query, now);
                None
            }
            SearchInput::Enter => Some(self.enter()),
            SearchInput::Escape => Some(self.escape()),
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// A background task that turns search-box input into filter passes.
pub struct DebouncedSearch {
    input: mpsc::UnboundedSender<SearchInput>,
    fired: mpsc::UnboundedReceiver<String>,
    task: JoinHandle<()>,
}

impl DebouncedSearch {
    pub fn spawn(delay: Duration) -> Self {
        let (input, mut inputs) = mpsc::unbounded_channel::<SearchInput>();
        let (fire, fired) = mpsc::unbounded_channel::<String>();

        let task = tokio::spawn(async move {
            let mut debouncer = Debouncer::new(delay);
            loop {
                let deadline = debouncer.deadline();
                tokio::select! {
                    event = inputs.recv() => {
                        let Some(event) = event else { break };
                        if let Some(query) = debouncer.handle(event, Instant::now()) {
                            debug!(query = %query, "search fired immediately");
                            if fire.send(query).is_err() {
                                break;
                            }
                        }
                    }
                    _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                        if let Some(query) = debouncer.poll(Instant::now()) {
                            debug!(query = %query, "search fired after debounce");
                            if fire.send(query).is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { input, fired, task }
    }

    fn send(&self, event: SearchInput) {
        // the task only stops once the receiver side is gone
        let _ = self.input.send(event);
    }

    pub fn keystroke(&self, query: impl Into<String>) {
        self.send(SearchInput::Keystroke(query.into()));
    }

    pub fn enter(&self) {
        self.send(SearchInput::Enter);
    }

    pub fn escape(&self) {
        self.send(SearchInput::Escape);
    }

    /// Wait for the next query that should run a filter pass.
    pub async fn next_query(&mut self) -> Option<String> {
        self.fired.recv().await
    }

    pub fn try_next_query(&mut self) -> Option<String> {
        self.fired.try_recv().ok()
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_last_keystroke_fires() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.keystroke("р", start);
        debouncer.keystroke("ре", start + Duration::from_millis(120));
        debouncer.keystroke("рец", start + Duration::from_millis(250));

        assert_eq!(debouncer.poll(start + Duration::from_millis(300)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(549)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(550)).as_deref(), Some("рец"));
        assert_eq!(debouncer.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_enter_bypasses_and_cancels() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.keystroke("бал", start);
        assert_eq!(debouncer.handle(SearchInput::Enter, start).as_deref(), Some("бал"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_escape_clears() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.keystroke("бал", start);
        assert_eq!(debouncer.handle(SearchInput::Escape, start).as_deref(), Some(""));
        assert_eq!(debouncer.query(), "");
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_search_fires_final_query() {
        let mut search = DebouncedSearch::spawn(DEFAULT_DEBOUNCE);
        let start = Instant::now();

        search.keystroke("р");
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.keystroke("ре");
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.keystroke("рец");

        assert_eq!(search.next_query().await.as_deref(), Some("рец"));
        assert!(start.elapsed() >= Duration::from_millis(500));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(search.try_next_query(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_search_enter_is_immediate() {
        let mut search = DebouncedSearch::spawn(DEFAULT_DEBOUNCE);
        let start = Instant::now();

        search.keystroke("бал");
        search.enter();
        assert_eq!(search.next_query().await.as_deref(), Some("бал"));
        assert!(start.elapsed() < DEFAULT_DEBOUNCE);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(search.try_next_query(), None);

        search.keystroke("бал");
        search.escape();
        assert_eq!(search.next_query().await.as_deref(), Some(""));
    }
}
