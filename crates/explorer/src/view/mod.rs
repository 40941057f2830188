//! Catalog listing controller.
//!
//! [`CatalogView`] owns the listing inputs (query text, barcode text,
//! category, sort key, page) and the list accumulated from successive pages.
//!
//! # Fetching
//!
//! A fetch is split into three steps so a host that keeps the view behind a
//! lock can release it across the network call:
//!
//! 1. [`CatalogView::begin_fetch`] marks the view loading and returns a
//!    [`FetchTicket`] describing the request for the current inputs
//! 2. [`FetchTicket::run`] performs the request against a [`CatalogSource`]
//! 3. [`CatalogView::complete`] applies the [`FetchOutcome`]
//!
//! [`CatalogView::refresh`] chains the three for hosts that own the view.
//!
//! Every input change bumps a generation counter. Outcomes carry the
//! generation they were issued for and are discarded when it is no longer
//! current, so a slow response for old inputs never overwrites the list.
//! Barcode lookups follow the same rule and are additionally superseded by
//! any later lookup.
//!
//! A ticket that will never be completed must be handed back through
//! [`CatalogView::abandon`] or [`CatalogView::abandon_barcode`]. The
//! chained [`CatalogView::refresh`] and [`CatalogView::lookup_barcode`] do
//! this themselves when their future is dropped early.

mod mode;
mod sort;

use std::fmt;
use std::sync::Arc;

use food_explorer_core::{Product, ProductCode, SortKey};
use tracing::{debug, instrument, warn};

use crate::catalog::{CatalogError, CatalogSource};

pub use mode::{DEFAULT_BROWSE_TERM, QueryMode};
pub use sort::{collate, compare_products, sort_products};

// =============================================================================
// Fetch Types
// =============================================================================

/// A paged fetch issued for one generation of inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    mode: QueryMode,
    page: u32,
    page_size: u32,
}

impl FetchTicket {
    /// Generation of the inputs this ticket was issued for.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Query mode at issue time.
    #[must_use]
    pub const fn mode(&self) -> &QueryMode {
        &self.mode
    }

    /// Requested 1-based page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Perform the request.
    pub async fn run<S: CatalogSource>(self, source: &S) -> FetchOutcome {
        let result = match &self.mode {
            QueryMode::Category(category) => source.search_by_category(category, self.page).await,
            QueryMode::Text(query) => {
                source
                    .search_by_text(query, self.page, self.page_size)
                    .await
            }
            QueryMode::Browse => {
                source
                    .search_by_text(DEFAULT_BROWSE_TERM, self.page, self.page_size)
                    .await
            }
        };

        FetchOutcome {
            ticket: self,
            result,
        }
    }
}

/// The result of running a [`FetchTicket`].
#[derive(Debug)]
pub struct FetchOutcome {
    ticket: FetchTicket,
    result: Result<Vec<Product>, CatalogError>,
}

impl FetchOutcome {
    /// The ticket this outcome answers.
    #[must_use]
    pub const fn ticket(&self) -> &FetchTicket {
        &self.ticket
    }
}

/// What [`CatalogView::complete`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// The page was applied.
    Loaded {
        /// Page that was applied.
        page: u32,
        /// Products in the fetched page.
        received: usize,
        /// Products in the list after applying it.
        total: usize,
    },
    /// The outcome belonged to an older generation and was dropped.
    Discarded,
    /// Nothing to fetch: the current inputs are loaded or being loaded.
    Skipped,
    /// The request failed; see [`CatalogView::last_error`].
    Failed,
}

/// Coarse classification of a failed request, for user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The catalog has no product for the code.
    NotFound,
    /// The input could not be turned into a request.
    InvalidInput,
    /// Transport, status or payload failure.
    Upstream,
}

/// The most recent failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// Classification.
    pub kind: FailureKind,
    /// Error message.
    pub message: String,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<&CatalogError> for FetchFailure {
    fn from(error: &CatalogError) -> Self {
        let kind = match error {
            CatalogError::NotFound(_) => FailureKind::NotFound,
            CatalogError::InvalidCode(_) | CatalogError::InvalidUrl(_) => FailureKind::InvalidInput,
            _ => FailureKind::Upstream,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

/// Identity of one barcode lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LookupId {
    seq: u64,
    generation: u64,
}

/// A barcode lookup issued by [`CatalogView::begin_barcode_lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeTicket {
    code: ProductCode,
    id: LookupId,
}

impl BarcodeTicket {
    /// The code being looked up.
    #[must_use]
    pub const fn code(&self) -> &ProductCode {
        &self.code
    }

    /// Perform the lookup.
    pub async fn run<S: CatalogSource>(self, source: &S) -> BarcodeOutcome {
        let result = source.get_by_barcode(&self.code).await;
        BarcodeOutcome {
            code: self.code,
            id: self.id,
            result,
        }
    }
}

/// The result of running a [`BarcodeTicket`].
#[derive(Debug)]
pub struct BarcodeOutcome {
    code: ProductCode,
    id: LookupId,
    result: Result<Product, CatalogError>,
}

impl BarcodeOutcome {
    /// The code that was looked up.
    #[must_use]
    pub const fn code(&self) -> &ProductCode {
        &self.code
    }
}

/// What the list currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Listing {
    Paged,
    Barcode(ProductCode),
}

/// A request whose loading marker is still set.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Fetch(u64),
    Lookup(LookupId),
}

/// Clears the loading marker of a request if the future driving it is
/// dropped before the outcome is applied.
struct PendingGuard<'a, S> {
    view: &'a mut CatalogView<S>,
    pending: Option<Pending>,
}

impl<'a, S> PendingGuard<'a, S> {
    const fn new(view: &'a mut CatalogView<S>, pending: Pending) -> Self {
        Self {
            view,
            pending: Some(pending),
        }
    }

    fn disarm(&mut self) {
        self.pending = None;
    }
}

impl<S> Drop for PendingGuard<'_, S> {
    fn drop(&mut self) {
        match self.pending.take() {
            Some(Pending::Fetch(generation)) => {
                debug!(generation, "Fetch dropped before completion");
                self.view.clear_fetch(generation);
            }
            Some(Pending::Lookup(id)) => {
                debug!(lookup = id.seq, "Barcode lookup dropped before completion");
                self.view.clear_lookup(id);
            }
            None => {}
        }
    }
}

// =============================================================================
// CatalogView
// =============================================================================

/// Listing controller over a [`CatalogSource`].
pub struct CatalogView<S> {
    source: Arc<S>,
    page_size: u32,

    query_text: String,
    barcode_text: String,
    category: Option<String>,
    sort_key: SortKey,
    page: u32,

    accumulated: Vec<Product>,
    display: Listing,
    generation: u64,
    in_flight: Option<u64>,
    loaded: Option<u64>,
    lookup_seq: u64,
    pending_lookup: Option<LookupId>,
    last_error: Option<FetchFailure>,
}

impl<S> CatalogView<S> {
    fn clear_fetch(&mut self, generation: u64) {
        if self.in_flight == Some(generation) {
            self.in_flight = None;
        }
    }

    fn clear_lookup(&mut self, id: LookupId) {
        if self.pending_lookup == Some(id) {
            self.pending_lookup = None;
        }
    }
}

impl<S: CatalogSource> CatalogView<S> {
    /// Create a view in browse mode on page 1 with an empty list.
    #[must_use]
    pub fn new(source: Arc<S>, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            query_text: String::new(),
            barcode_text: String::new(),
            category: None,
            sort_key: SortKey::default(),
            page: 1,
            accumulated: Vec::new(),
            display: Listing::Paged,
            generation: 0,
            in_flight: None,
            loaded: None,
            lookup_seq: 0,
            pending_lookup: None,
            last_error: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The displayed products, sorted by the active key.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.accumulated
    }

    /// The current query mode.
    #[must_use]
    pub fn mode(&self) -> QueryMode {
        QueryMode::derive(self.category.as_deref(), &self.query_text)
    }

    #[must_use]
    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    #[must_use]
    pub fn barcode_text(&self) -> &str {
        &self.barcode_text
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub const fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Generation of the current inputs.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a request for the current inputs is pending, either a paged
    /// fetch or the latest barcode lookup.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight == Some(self.generation)
            || self
                .pending_lookup
                .is_some_and(|id| id.generation == self.generation)
    }

    /// Whether the current inputs have neither been loaded nor requested.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        self.loaded != Some(self.generation) && self.in_flight != Some(self.generation)
    }

    /// The code of the displayed barcode result, if the list shows one.
    #[must_use]
    pub const fn barcode_result(&self) -> Option<&ProductCode> {
        match &self.display {
            Listing::Barcode(code) => Some(code),
            Listing::Paged => None,
        }
    }

    /// The most recent failure, cleared by the next successful fetch.
    #[must_use]
    pub const fn last_error(&self) -> Option<&FetchFailure> {
        self.last_error.as_ref()
    }

    /// The source this view fetches from.
    #[must_use]
    pub fn source(&self) -> Arc<S> {
        Arc::clone(&self.source)
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Set the free-text query. A change resets to page 1.
    pub fn set_query_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.query_text {
            self.query_text = text;
            self.reset_paging();
        }
    }

    /// Set the barcode input. Nothing is fetched until
    /// [`lookup_barcode`](Self::lookup_barcode).
    pub fn set_barcode_text(&mut self, text: impl Into<String>) {
        self.barcode_text = text.into();
    }

    /// Select a category filter, or clear it with `None`. A change resets to
    /// page 1.
    pub fn set_category(&mut self, category: Option<String>) {
        let category = category.filter(|c| !c.trim().is_empty());
        if category != self.category {
            self.category = category;
            self.reset_paging();
        }
    }

    /// Change the sort key. The current list is re-sorted immediately and
    /// paging resets to page 1.
    pub fn set_sort_key(&mut self, key: SortKey) {
        if key != self.sort_key {
            self.sort_key = key;
            sort_products(&mut self.accumulated, key);
            self.reset_paging();
        }
    }

    /// Advance to the next page.
    ///
    /// Refused while loading, while the list is empty, while a barcode
    /// result is displayed, or while the current page has not loaded.
    pub fn load_more(&mut self) -> bool {
        if self.is_loading()
            || self.accumulated.is_empty()
            || self.barcode_result().is_some()
            || self.loaded != Some(self.generation)
        {
            return false;
        }

        self.page += 1;
        self.bump_generation();
        true
    }

    /// Leave a displayed barcode result and return to the paged list.
    pub fn show_catalog(&mut self) -> bool {
        if self.barcode_result().is_none() {
            return false;
        }
        self.display = Listing::Paged;
        self.reset_paging();
        true
    }

    fn reset_paging(&mut self) {
        self.page = 1;
        self.bump_generation();
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
    }

    // =========================================================================
    // Paged Fetch
    // =========================================================================

    /// Start a fetch for the current inputs.
    ///
    /// Returns `None` when the current inputs are already loaded or being
    /// loaded.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if !self.needs_refresh() {
            return None;
        }

        self.in_flight = Some(self.generation);
        Some(FetchTicket {
            generation: self.generation,
            mode: self.mode(),
            page: self.page,
            page_size: self.page_size,
        })
    }

    /// Apply a fetch outcome.
    ///
    /// Page 1 replaces the list, later pages append to it, and the whole list
    /// is re-sorted. A failure leaves the list untouched.
    pub fn complete(&mut self, outcome: FetchOutcome) -> FetchStatus {
        let FetchOutcome { ticket, result } = outcome;

        self.clear_fetch(ticket.generation);

        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                mode = %ticket.mode,
                page = ticket.page,
                "Discarding stale fetch result"
            );
            return FetchStatus::Discarded;
        }

        match result {
            Ok(batch) => {
                let received = batch.len();
                if ticket.page <= 1 {
                    self.accumulated = batch;
                } else {
                    self.accumulated.extend(batch);
                }
                sort_products(&mut self.accumulated, self.sort_key);

                self.display = Listing::Paged;
                self.loaded = Some(ticket.generation);
                self.last_error = None;

                debug!(
                    mode = %ticket.mode,
                    page = ticket.page,
                    received,
                    total = self.accumulated.len(),
                    "Page applied"
                );

                FetchStatus::Loaded {
                    page: ticket.page,
                    received,
                    total: self.accumulated.len(),
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    mode = %ticket.mode,
                    page = ticket.page,
                    "Catalog fetch failed"
                );
                self.last_error = Some(FetchFailure::from(&e));
                FetchStatus::Failed
            }
        }
    }

    /// Give up on a ticket without an outcome, clearing the loading state.
    pub fn abandon(&mut self, ticket: &FetchTicket) {
        self.clear_fetch(ticket.generation);
    }

    /// Fetch the current inputs and apply the result.
    #[instrument(skip(self), fields(generation = self.generation, page = self.page))]
    pub async fn refresh(&mut self) -> FetchStatus {
        let Some(ticket) = self.begin_fetch() else {
            return FetchStatus::Skipped;
        };

        let source = Arc::clone(&self.source);
        let mut guard = PendingGuard::new(self, Pending::Fetch(ticket.generation));
        let outcome = ticket.run(source.as_ref()).await;
        guard.disarm();
        guard.view.complete(outcome)
    }

    // =========================================================================
    // Barcode Lookup
    // =========================================================================

    /// Start a lookup of the current barcode text.
    ///
    /// The new lookup supersedes any lookup still pending.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidCode`] if the text is not a product
    /// code. The failure is also recorded in [`last_error`](Self::last_error).
    pub fn begin_barcode_lookup(&mut self) -> Result<BarcodeTicket, CatalogError> {
        match ProductCode::parse(&self.barcode_text) {
            Ok(code) => {
                self.lookup_seq += 1;
                let id = LookupId {
                    seq: self.lookup_seq,
                    generation: self.generation,
                };
                self.pending_lookup = Some(id);
                Ok(BarcodeTicket { code, id })
            }
            Err(e) => {
                let error = CatalogError::from(e);
                self.last_error = Some(FetchFailure::from(&error));
                Err(error)
            }
        }
    }

    /// Apply a barcode outcome.
    ///
    /// On success the list is replaced by the single product and any paged
    /// fetch still in flight becomes stale. Returns `Ok(None)` without
    /// touching the view when the lookup was superseded by a later lookup
    /// or the inputs changed since it was issued.
    ///
    /// # Errors
    ///
    /// Returns the lookup error of a current lookup, leaving the list
    /// untouched.
    pub fn complete_barcode(
        &mut self,
        outcome: BarcodeOutcome,
    ) -> Result<Option<Product>, CatalogError> {
        let BarcodeOutcome { code, id, result } = outcome;
        self.clear_lookup(id);

        if id.seq != self.lookup_seq || id.generation != self.generation {
            debug!(
                code = %code,
                lookup = id.seq,
                latest = self.lookup_seq,
                ticket = id.generation,
                current = self.generation,
                "Discarding stale barcode result"
            );
            return Ok(None);
        }

        self.apply_barcode(code, result).map(Some)
    }

    /// Give up on a barcode lookup without an outcome, clearing the loading
    /// state.
    pub fn abandon_barcode(&mut self, ticket: &BarcodeTicket) {
        self.clear_lookup(ticket.id);
    }

    /// Look up the current barcode text and display the result.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidCode`] for unusable input,
    /// [`CatalogError::NotFound`] for unknown codes, or the upstream error.
    /// The displayed list is left untouched on any failure.
    #[instrument(skip(self), fields(barcode = %self.barcode_text))]
    pub async fn lookup_barcode(&mut self) -> Result<Product, CatalogError> {
        let ticket = self.begin_barcode_lookup()?;
        let source = Arc::clone(&self.source);
        let mut guard = PendingGuard::new(self, Pending::Lookup(ticket.id));
        let BarcodeOutcome { code, id, result } = ticket.run(source.as_ref()).await;
        guard.disarm();
        guard.view.clear_lookup(id);
        guard.view.apply_barcode(code, result)
    }

    fn apply_barcode(
        &mut self,
        code: ProductCode,
        result: Result<Product, CatalogError>,
    ) -> Result<Product, CatalogError> {
        match result {
            Ok(product) => {
                self.bump_generation();
                self.accumulated = vec![product.clone()];
                self.display = Listing::Barcode(code);
                self.loaded = Some(self.generation);
                self.last_error = None;
                Ok(product)
            }
            Err(e) => {
                if e.is_not_found() {
                    debug!(code = %code, "Barcode not in catalog");
                } else {
                    warn!(code = %code, error = %e, "Barcode lookup failed");
                }
                self.last_error = Some(FetchFailure::from(&e));
                Err(e)
            }
        }
    }
}
