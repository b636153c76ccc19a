//! Dashboard state: query text, loading flag, error message, result cards.
//!
//! No I/O happens here. `App` issues the requests and feeds the outcomes back
//! through `complete` / `complete_refresh`.

use std::collections::HashSet;

use search_client::{SearchError, SearchResponse, SearchResult, StockRecord};

use crate::card::CardKey;

/// Handle for one issued search. Only the latest ticket is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Handle for a details refresh of one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
    pub key: CardKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub key: CardKey,
    pub record: StockRecord,
    pub expanded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status<'a> {
    Idle,
    Loading,
    Failed(&'a str),
    NoResults,
    Showing(usize),
}

#[derive(Debug, Default)]
pub struct Dashboard {
    query: String,
    loading: bool,
    error: Option<String>,
    cards: Vec<Card>,
    selected: usize,
    issued: u64,
    searched: bool,
    refreshing: Option<RefreshTicket>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn refreshing(&self) -> Option<&CardKey> {
        self.refreshing.as_ref().map(|t| &t.key)
    }

    pub fn status(&self) -> Status<'_> {
        if self.loading {
            Status::Loading
        } else if let Some(err) = &self.error {
            Status::Failed(err)
        } else if !self.searched {
            Status::Idle
        } else if self.cards.is_empty() {
            Status::NoResults
        } else {
            Status::Showing(self.cards.len())
        }
    }

    /// Start a search for the current query. Returns `None` (and changes
    /// nothing) when the trimmed query is empty or a search is outstanding.
    pub fn submit(&mut self) -> Option<(SearchTicket, String)> {
        let query = self.query.trim();
        if query.is_empty() || self.loading {
            return None;
        }
        let query = query.to_string();

        self.issued += 1;
        self.loading = true;
        self.error = None;
        Some((SearchTicket(self.issued), query))
    }

    /// Apply a search outcome. Returns false when the ticket is stale.
    pub fn complete(&mut self, ticket: SearchTicket, result: SearchResult<SearchResponse>) -> bool {
        if ticket.0 != self.issued {
            return false;
        }

        self.loading = false;
        self.searched = true;
        self.selected = 0;

        match result {
            Ok(response) => {
                self.error = None;
                self.replace_results(response.results);
            }
            Err(err) => {
                self.error = Some(error_message(&err));
                self.cards.clear();
            }
        }
        true
    }

    /// Cards whose key (symbol + position) survives keep their expand state.
    fn replace_results(&mut self, records: Vec<StockRecord>) {
        let expanded: HashSet<CardKey> = self
            .cards
            .iter()
            .filter(|c| c.expanded)
            .map(|c| c.key.clone())
            .collect();

        self.cards = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let key = CardKey::new(record.symbol.clone(), index);
                Card {
                    expanded: expanded.contains(&key),
                    key,
                    record,
                }
            })
            .collect();
    }

    pub fn toggle(&mut self, index: usize) {
        if let Some(card) = self.cards.get_mut(index) {
            card.expanded = !card.expanded;
        }
    }

    pub fn toggle_selected(&mut self) {
        self.toggle(self.selected);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.cards.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Re-fetch the selected card. One refresh at a time, never during a
    /// search.
    pub fn begin_refresh(&mut self) -> Option<RefreshTicket> {
        if self.loading || self.refreshing.is_some() {
            return None;
        }
        let card = self.cards.get(self.selected)?;
        let ticket = RefreshTicket {
            generation: self.issued,
            key: card.key.clone(),
        };
        self.refreshing = Some(ticket.clone());
        Some(ticket)
    }

    /// Apply a refresh outcome. Returns false when a newer search has
    /// replaced the card set since the refresh started.
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, result: SearchResult<StockRecord>) -> bool {
        if self.refreshing.as_ref() == Some(&ticket) {
            self.refreshing = None;
        }
        if ticket.generation != self.issued {
            return false;
        }

        let Some(card) = self
            .cards
            .get_mut(ticket.key.index)
            .filter(|c| c.key == ticket.key)
        else {
            return false;
        };

        match result {
            Ok(record) => {
                card.record = StockRecord {
                    symbol: card.key.symbol.clone(),
                    ..record
                };
                self.error = None;
            }
            Err(err) => {
                self.error = Some(format!("Refresh of {} failed: {}", ticket.key.symbol, err));
            }
        }
        true
    }
}

fn error_message(err: &SearchError) -> String {
    match err {
        SearchError::Application(msg) => msg.clone(),
        other => format!("Failed to perform search: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(symbols: &[&str]) -> SearchResult<SearchResponse> {
        Ok(SearchResponse {
            results: symbols.iter().map(|s| StockRecord::new(*s)).collect(),
        })
    }

    fn searched(symbols: &[&str]) -> Dashboard {
        let mut dash = Dashboard::new();
        dash.set_query("tech stocks");
        let (ticket, _) = dash.submit().unwrap();
        assert!(dash.complete(ticket, response(symbols)));
        dash
    }

    #[test]
    fn test_empty_query_is_noop() {
        let mut dash = Dashboard::new();
        assert!(dash.submit().is_none());

        dash.set_query("   \t");
        assert!(dash.submit().is_none());
        assert!(!dash.is_loading());
        assert_eq!(dash.status(), Status::Idle);
    }

    #[test]
    fn test_submit_is_refused_while_loading() {
        let mut dash = Dashboard::new();
        dash.set_query("  semiconductors ");

        let (_, query) = dash.submit().unwrap();
        assert_eq!(query, "semiconductors");
        assert!(dash.is_loading());
        assert_eq!(dash.status(), Status::Loading);

        assert!(dash.submit().is_none());
    }

    #[test]
    fn test_results_replace_previous_set() {
        let mut dash = searched(&["AAPL", "MSFT"]);
        assert_eq!(dash.status(), Status::Showing(2));

        let (ticket, _) = dash.submit().unwrap();
        dash.complete(ticket, response(&["NVDA"]));

        let symbols: Vec<&str> = dash.cards().iter().map(|c| c.key.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["NVDA"]);
    }

    #[test]
    fn test_no_results_is_not_an_error() {
        let dash = searched(&[]);
        assert_eq!(dash.status(), Status::NoResults);
        assert!(dash.error().is_none());
    }

    #[test]
    fn test_error_clears_results_and_loading() {
        let mut dash = searched(&["AAPL"]);
        let (ticket, _) = dash.submit().unwrap();
        dash.complete(ticket, Err(SearchError::Application("quota exceeded".into())));

        assert!(!dash.is_loading());
        assert!(dash.cards().is_empty());
        assert_eq!(dash.status(), Status::Failed("quota exceeded"));

        let (ticket, _) = dash.submit().unwrap();
        assert!(dash.error().is_none());
        dash.complete(
            ticket,
            Err(SearchError::Protocol {
                status: 502,
                body: "bad gateway".into(),
            }),
        );
        assert_eq!(
            dash.error(),
            Some("Failed to perform search: API error: 502 - bad gateway")
        );
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let mut dash = Dashboard::new();
        dash.set_query("banks");
        let (first, _) = dash.submit().unwrap();
        dash.complete(first, response(&["JPM"]));
        let (second, _) = dash.submit().unwrap();

        assert!(!dash.complete(first, response(&["WFC"])));
        assert!(dash.is_loading());
        assert_eq!(dash.cards()[0].key.symbol, "JPM");

        assert!(dash.complete(second, response(&["BAC"])));
        assert_eq!(dash.cards()[0].key.symbol, "BAC");
    }

    #[test]
    fn test_toggle_is_per_card() {
        let mut dash = searched(&["AAPL", "MSFT", "GOOG"]);
        dash.toggle(1);

        let expanded: Vec<bool> = dash.cards().iter().map(|c| c.expanded).collect();
        assert_eq!(expanded, vec![false, true, false]);

        dash.toggle(1);
        assert!(dash.cards().iter().all(|c| !c.expanded));

        dash.toggle(10);
        assert!(dash.cards().iter().all(|c| !c.expanded));
    }

    #[test]
    fn test_expand_state_follows_card_identity() {
        let mut dash = searched(&["AAPL", "MSFT"]);
        dash.toggle(0);
        dash.toggle(1);

        let (ticket, _) = dash.submit().unwrap();
        dash.complete(ticket, response(&["AAPL", "AMZN", "MSFT"]));

        let expanded: Vec<bool> = dash.cards().iter().map(|c| c.expanded).collect();
        assert_eq!(expanded, vec![true, false, false]);
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut dash = searched(&["AAPL", "MSFT"]);
        dash.select_prev();
        assert_eq!(dash.selected(), 0);
        dash.select_next();
        dash.select_next();
        assert_eq!(dash.selected(), 1);

        dash.toggle_selected();
        assert!(dash.cards()[1].expanded);
    }

    #[test]
    fn test_refresh_replaces_record_in_place() {
        let mut dash = searched(&["AAPL", "MSFT"]);
        dash.select_next();
        dash.toggle_selected();

        let ticket = dash.begin_refresh().unwrap();
        assert_eq!(ticket.key, CardKey::new("MSFT", 1));
        assert!(dash.begin_refresh().is_none());

        let mut fresh = StockRecord::new("msft");
        fresh.current_price = Some(415.0);
        assert!(dash.complete_refresh(ticket, Ok(fresh)));

        let card = &dash.cards()[1];
        assert_eq!(card.record.symbol, "MSFT");
        assert_eq!(card.record.current_price, Some(415.0));
        assert!(card.expanded);
        assert!(dash.refreshing().is_none());
    }

    #[test]
    fn test_refresh_after_new_search_is_dropped() {
        let mut dash = searched(&["AAPL"]);
        let ticket = dash.begin_refresh().unwrap();

        let (search, _) = dash.submit().unwrap();
        dash.complete(search, response(&["AAPL"]));

        let mut fresh = StockRecord::new("AAPL");
        fresh.current_price = Some(1.0);
        assert!(!dash.complete_refresh(ticket, Ok(fresh)));
        assert_eq!(dash.cards()[0].record.current_price, None);
        assert!(dash.refreshing().is_none());
    }

    #[test]
    fn test_refresh_error_keeps_cards() {
        let mut dash = searched(&["AAPL"]);
        let ticket = dash.begin_refresh().unwrap();
        dash.complete_refresh(ticket, Err(SearchError::Format("not JSON".into())));

        assert_eq!(dash.cards().len(), 1);
        assert_eq!(
            dash.error(),
            Some("Refresh of AAPL failed: Invalid response format: not JSON")
        );
    }
}
