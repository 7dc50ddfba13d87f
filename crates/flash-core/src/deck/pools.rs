//! Deck state machine
//!
//! Cards move `new -> scheduled -> due -> (failed | scheduled)`. A review
//! pops the card from its pool, runs the interval algorithm, and routes it:
//! bad grades go to the tail of the failed queue, passing grades go into the
//! scheduled heap keyed by their next due time. [`Deck::check_repetitions`]
//! moves every scheduled card whose time has come into the due pool.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::{Card, CardId, DeckError, DeckSummary, Pool, Result, ReviewOutcome, ReviewPrompt};
use crate::queue::{AdaptablePriorityQueue, FifoQueue, Handle};
use crate::scheduling::{due_after, latest_due, Grade, IntervalAlgorithm};

/// Where a card currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    New,
    Failed,
    Due,
    Scheduled(Handle),
}

impl Location {
    fn pool(self) -> Pool {
        match self {
            Location::New => Pool::New,
            Location::Failed => Pool::Failed,
            Location::Due => Pool::Due,
            Location::Scheduled(_) => Pool::Scheduled,
        }
    }
}

/// A named deck owning four disjoint pools of cards
///
/// Besides the pools, the deck keeps an identity index from [`CardId`] to the
/// card's current location (including its heap handle when scheduled), so
/// edits, deletions and targeted reviews never search by label.
#[derive(Debug, Clone)]
pub struct Deck {
    name: String,
    new: VecDeque<Card>,
    fails: FifoQueue<Card>,
    due: VecDeque<Card>,
    scheduled: AdaptablePriorityQueue<DateTime<Utc>, Card>,
    locations: HashMap<CardId, Location>,
    algorithm: IntervalAlgorithm,
}

impl Deck {
    /// Create an empty deck using the default interval parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_algorithm(name, IntervalAlgorithm::default())
    }

    pub fn with_algorithm(name: impl Into<String>, algorithm: IntervalAlgorithm) -> Self {
        Self {
            name: name.into(),
            new: VecDeque::new(),
            fails: FifoQueue::new(),
            due: VecDeque::new(),
            scheduled: AdaptablePriorityQueue::new(),
            locations: HashMap::new(),
            algorithm,
        }
    }

    /// Rebuild a deck from its pools.
    ///
    /// `scheduled` is inserted in the given order; feeding it the heap array
    /// order of a previous deck reproduces the same heap. Fails with
    /// [`DeckError::DuplicateCard`] if a card id appears more than once.
    pub fn from_parts(
        name: impl Into<String>,
        new: Vec<Card>,
        fails: Vec<Card>,
        due: Vec<Card>,
        scheduled: Vec<(DateTime<Utc>, Card)>,
    ) -> Result<Self> {
        let mut deck = Self::new(name);

        for card in new {
            deck.claim(card.id, Location::New)?;
            deck.new.push_back(card);
        }
        for card in fails {
            deck.claim(card.id, Location::Failed)?;
            deck.fails.add(card);
        }
        for card in due {
            deck.claim(card.id, Location::Due)?;
            deck.due.push_back(card);
        }
        for (due_at, card) in scheduled {
            let id = card.id;
            if deck.locations.contains_key(&id) {
                return Err(DeckError::DuplicateCard(id));
            }
            let handle = deck.scheduled.add(due_at, card);
            deck.locations.insert(id, Location::Scheduled(handle));
        }

        Ok(deck)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn algorithm(&self) -> &IntervalAlgorithm {
        &self.algorithm
    }

    pub fn set_algorithm(&mut self, algorithm: IntervalAlgorithm) {
        self.algorithm = algorithm;
    }

    // ========================================================================
    // COUNTS
    // ========================================================================

    /// Total number of cards across all four pools
    pub fn check_total_size(&self) -> usize {
        self.new.len() + self.fails.len() + self.due.len() + self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.check_total_size() == 0
    }

    /// Number of cards in `pool`
    pub fn pool_len(&self, pool: Pool) -> usize {
        match pool {
            Pool::New => self.new.len(),
            Pool::Failed => self.fails.len(),
            Pool::Due => self.due.len(),
            Pool::Scheduled => self.scheduled.len(),
        }
    }

    /// Earliest due time in the scheduled pool
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.scheduled.min().ok().map(|(_, due_at)| *due_at)
    }

    /// Counts for deck listings, treating scheduled cards due by `now` as due
    pub fn summary(&self, now: DateTime<Utc>) -> DeckSummary {
        let ready = self
            .scheduled
            .iter()
            .filter(|element| *element.key() <= now)
            .count();
        let next_due = self
            .scheduled
            .iter()
            .map(|element| *element.key())
            .filter(|due_at| *due_at > now)
            .min();

        DeckSummary {
            name: self.name.clone(),
            total: self.check_total_size(),
            due: self.due.len() + ready,
            new: self.new.len(),
            failed: self.fails.len(),
            scheduled: self.scheduled.len(),
            next_due,
        }
    }

    // ========================================================================
    // ADDING CARDS
    // ========================================================================

    /// Add a card to the tail of the new pool
    pub fn add_card(&mut self, front: &str, back: &str) -> Result<CardId> {
        let (front, back) = validate_labels(front, back)?;
        let card = self.fresh_card(front, back);
        Ok(self.push_new(card))
    }

    /// Add a card and its reverse (back -> front)
    pub fn add_two_sided(&mut self, front: &str, back: &str) -> Result<(CardId, CardId)> {
        let (front, back) = validate_labels(front, back)?;
        let card = self.fresh_card(front, back);
        let reverse = self.fresh_card(card.back.clone(), card.front.clone());
        Ok((self.push_new(card), self.push_new(reverse)))
    }

    /// Bulk-add label pairs, skipping pairs the deck already holds and blank
    /// pairs. Returns the number of cards added.
    pub fn import_pairs<I, F, B>(&mut self, pairs: I, two_sided: bool) -> usize
    where
        I: IntoIterator<Item = (F, B)>,
        F: AsRef<str>,
        B: AsRef<str>,
    {
        let mut added = 0;
        for (front, back) in pairs {
            let (front, back) = match validate_labels(front.as_ref(), back.as_ref()) {
                Ok(labels) => labels,
                Err(_) => {
                    warn!(deck = %self.name, "Skipping import pair with a blank label");
                    continue;
                }
            };

            if self.find_by_labels(&front, &back).is_none() {
                let card = self.fresh_card(front.clone(), back.clone());
                self.push_new(card);
                added += 1;
            }
            if two_sided && self.find_by_labels(&back, &front).is_none() {
                let card = self.fresh_card(back, front);
                self.push_new(card);
                added += 1;
            }
        }

        info!(deck = %self.name, added, "Imported cards");
        added
    }

    /// An unreviewed card starting at this deck's initial easiness
    fn fresh_card(&self, front: String, back: String) -> Card {
        let mut card = Card::new(front, back);
        card.easiness = self.algorithm.params().initial_easiness;
        card
    }

    fn push_new(&mut self, card: Card) -> CardId {
        let id = card.id;
        self.locations.insert(id, Location::New);
        self.new.push_back(card);
        id
    }

    fn claim(&mut self, id: CardId, location: Location) -> Result<()> {
        if self.locations.insert(id, location).is_some() {
            return Err(DeckError::DuplicateCard(id));
        }
        Ok(())
    }

    // ========================================================================
    // DUE SWEEP
    // ========================================================================

    /// Move every scheduled card due at or before `now` into the due pool,
    /// earliest first. Returns the number of cards promoted.
    pub fn check_repetitions(&mut self, now: DateTime<Utc>) -> usize {
        let mut promoted = 0;
        loop {
            let due_at = match self.scheduled.min() {
                Ok((_, due_at)) => *due_at,
                Err(_) => break,
            };
            if due_at > now {
                break;
            }
            let Some((_, card)) = self.scheduled.remove_min() else {
                break;
            };
            self.locations.insert(card.id, Location::Due);
            self.due.push_back(card);
            promoted += 1;
        }

        if promoted > 0 {
            debug!(deck = %self.name, promoted, "Promoted scheduled cards to due");
        }
        promoted
    }

    // ========================================================================
    // REVIEWING
    // ========================================================================

    /// The card at the head of `pool` (the minimum for the scheduled pool)
    pub fn peek(&self, pool: Pool) -> Result<&Card> {
        let card = match pool {
            Pool::New => self.new.front(),
            Pool::Failed => self.fails.front().ok(),
            Pool::Due => self.due.front(),
            Pool::Scheduled => self.scheduled.min().ok().map(|(card, _)| card),
        };
        card.ok_or(DeckError::EmptyPool(pool))
    }

    /// What to show for the next review from `pool`
    pub fn prompt(&self, pool: Pool) -> Result<ReviewPrompt> {
        let card = self.peek(pool)?;
        Ok(ReviewPrompt {
            card_id: card.id,
            front: card.front.clone(),
            back: card.back.clone(),
            remaining: self.pool_len(pool),
        })
    }

    /// Review the card at the head of `pool`
    pub fn review_next(
        &mut self,
        pool: Pool,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome> {
        let card = self.take_head(pool)?;
        Ok(self.route(card, grade, now))
    }

    /// Review the head of `pool` with an unchecked numeric grade.
    ///
    /// The grade is validated before anything moves, so a rejected grade
    /// leaves the deck untouched.
    pub fn submit_grade(&mut self, pool: Pool, grade: i64, now: DateTime<Utc>) -> Result<ReviewOutcome> {
        let grade = Grade::try_from(grade)?;
        self.review_next(pool, grade, now)
    }

    /// Review a specific card wherever it currently is.
    ///
    /// A passing early review of a scheduled card re-keys it in place.
    pub fn review_card(
        &mut self,
        id: CardId,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome> {
        if let Location::Scheduled(handle) = self.location(id)? {
            if grade.is_pass() {
                let card = self.scheduled.get_mut(handle)?;
                *card = self.algorithm.apply(card.clone(), grade, now);
                let due_at = due_after(now, card.interval);
                let outcome = outcome(card, grade, Pool::Scheduled, Some(due_at));
                self.scheduled.update_key(handle, due_at)?;
                debug!(deck = %self.name, card = %id, %due_at, "Rescheduled card after early review");
                return Ok(outcome);
            }
        }

        let card = self.take(id)?;
        Ok(self.route(card, grade, now))
    }

    /// Send the head of the failed queue to its tail
    pub fn skip_failed(&mut self) -> Result<()> {
        self.fails
            .move_to_end()
            .map_err(|_| DeckError::EmptyPool(Pool::Failed))
    }

    /// Put a card into the scheduled pool at `due_at`, whatever pool it is in.
    /// Its review state is left unchanged.
    pub fn reschedule(&mut self, id: CardId, due_at: DateTime<Utc>) -> Result<()> {
        let due_at = due_at.min(latest_due());
        if let Location::Scheduled(handle) = self.location(id)? {
            self.scheduled.update_key(handle, due_at)?;
        } else {
            let card = self.take(id)?;
            let handle = self.scheduled.add(due_at, card);
            self.locations.insert(id, Location::Scheduled(handle));
        }
        debug!(deck = %self.name, card = %id, %due_at, "Card rescheduled");
        Ok(())
    }

    fn take_head(&mut self, pool: Pool) -> Result<Card> {
        let card = match pool {
            Pool::New => self.new.pop_front(),
            Pool::Failed => self.fails.remove().ok(),
            Pool::Due => self.due.pop_front(),
            Pool::Scheduled => self.scheduled.remove_min().map(|(_, card)| card),
        }
        .ok_or(DeckError::EmptyPool(pool))?;

        self.locations.remove(&card.id);
        Ok(card)
    }

    /// Apply the algorithm and file the card under its new pool
    fn route(&mut self, card: Card, grade: Grade, now: DateTime<Utc>) -> ReviewOutcome {
        let card = self.algorithm.apply(card, grade, now);
        let id = card.id;

        let result = if grade.is_pass() {
            let due_at = due_after(now, card.interval);
            let result = outcome(&card, grade, Pool::Scheduled, Some(due_at));
            let handle = self.scheduled.add(due_at, card);
            self.locations.insert(id, Location::Scheduled(handle));
            result
        } else {
            let result = outcome(&card, grade, Pool::Failed, None);
            self.locations.insert(id, Location::Failed);
            self.fails.add(card);
            result
        };

        debug!(
            deck = %self.name,
            card = %id,
            %grade,
            pool = %result.pool,
            interval = result.interval,
            "Card reviewed"
        );
        result
    }

    // ========================================================================
    // LOOKUP, EDIT, DELETE
    // ========================================================================

    /// The card with this id, in any pool
    pub fn card(&self, id: CardId) -> Option<&Card> {
        match self.locations.get(&id)? {
            Location::New => self.new.iter().find(|card| card.id == id),
            Location::Failed => self.fails.iter().find(|card| card.id == id),
            Location::Due => self.due.iter().find(|card| card.id == id),
            Location::Scheduled(handle) => self.scheduled.get(*handle).ok(),
        }
    }

    /// Pool currently holding the card
    pub fn pool_of(&self, id: CardId) -> Option<Pool> {
        self.locations.get(&id).map(|location| location.pool())
    }

    /// Due time of a scheduled card
    pub fn due_at(&self, id: CardId) -> Option<DateTime<Utc>> {
        match self.locations.get(&id)? {
            Location::Scheduled(handle) => self.scheduled.get_key(*handle).ok().copied(),
            _ => None,
        }
    }

    /// First card with exactly these labels
    pub fn find_by_labels(&self, front: &str, back: &str) -> Option<CardId> {
        self.cards()
            .find(|(_, card)| card.has_labels(front, back))
            .map(|(_, card)| card.id)
    }

    /// Change a card's labels, keeping its scheduling state
    pub fn edit_card(&mut self, id: CardId, front: &str, back: &str) -> Result<()> {
        let (front, back) = validate_labels(front, back)?;
        let card = self.card_mut(id)?;
        card.front = front;
        card.back = back;
        Ok(())
    }

    /// Remove a card from the deck, returning it
    pub fn delete_card(&mut self, id: CardId) -> Result<Card> {
        let card = self.take(id)?;
        info!(deck = %self.name, card = %id, "Card deleted");
        Ok(card)
    }

    fn location(&self, id: CardId) -> Result<Location> {
        self.locations
            .get(&id)
            .copied()
            .ok_or(DeckError::CardNotFound(id))
    }

    fn card_mut(&mut self, id: CardId) -> Result<&mut Card> {
        let card = match self.location(id)? {
            Location::New => self.new.iter_mut().find(|card| card.id == id),
            Location::Failed => self.fails.iter_mut().find(|card| card.id == id),
            Location::Due => self.due.iter_mut().find(|card| card.id == id),
            Location::Scheduled(handle) => Some(self.scheduled.get_mut(handle)?),
        };
        card.ok_or(DeckError::CardNotFound(id))
    }

    /// Detach a card from whichever pool holds it
    fn take(&mut self, id: CardId) -> Result<Card> {
        let card = match self.location(id)? {
            Location::New => take_from(&mut self.new, id),
            Location::Due => take_from(&mut self.due, id),
            Location::Failed => {
                let position = self.fails.iter().position(|card| card.id == id);
                position.and_then(|position| self.fails.remove_at(position))
            }
            Location::Scheduled(handle) => Some(self.scheduled.remove(handle)?.1),
        }
        .ok_or(DeckError::CardNotFound(id))?;

        self.locations.remove(&id);
        Ok(card)
    }

    // ========================================================================
    // ITERATION
    // ========================================================================

    /// Every card with its pool: new, failed, due, then scheduled (heap order)
    pub fn cards(&self) -> impl Iterator<Item = (Pool, &Card)> {
        self.new
            .iter()
            .map(|card| (Pool::New, card))
            .chain(self.fails.iter().map(|card| (Pool::Failed, card)))
            .chain(self.due.iter().map(|card| (Pool::Due, card)))
            .chain(
                self.scheduled
                    .iter()
                    .map(|element| (Pool::Scheduled, element.value())),
            )
    }

    pub fn new_cards(&self) -> impl Iterator<Item = &Card> {
        self.new.iter()
    }

    /// Failed cards, head of the retry queue first
    pub fn failed_cards(&self) -> impl Iterator<Item = &Card> {
        self.fails.iter()
    }

    pub fn due_cards(&self) -> impl Iterator<Item = &Card> {
        self.due.iter()
    }

    /// Scheduled cards with their due times, in heap array order
    pub fn scheduled_cards(&self) -> impl Iterator<Item = (DateTime<Utc>, &Card)> {
        self.scheduled
            .iter()
            .map(|element| (*element.key(), element.value()))
    }

    /// Check that every card sits in exactly one pool, that the identity
    /// index agrees with the pools, and that the scheduled heap is ordered.
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        for (pool, card) in self.cards() {
            if !seen.insert(card.id) {
                return false;
            }
            match self.locations.get(&card.id) {
                Some(location) if location.pool() == pool => {}
                _ => return false,
            }
        }

        let handles_agree = self.locations.iter().all(|(id, location)| match location {
            Location::Scheduled(handle) => {
                self.scheduled.get(*handle).map(|card| card.id) == Ok(*id)
            }
            _ => true,
        });

        handles_agree && seen.len() == self.locations.len() && self.scheduled.is_heap_ordered()
    }
}

fn validate_labels(front: &str, back: &str) -> Result<(String, String)> {
    let (front, back) = (front.trim(), back.trim());
    if front.is_empty() || back.is_empty() {
        return Err(DeckError::EmptyLabel);
    }
    Ok((front.to_string(), back.to_string()))
}

fn take_from(list: &mut VecDeque<Card>, id: CardId) -> Option<Card> {
    let position = list.iter().position(|card| card.id == id)?;
    list.remove(position)
}

fn outcome(card: &Card, grade: Grade, pool: Pool, due_at: Option<DateTime<Utc>>) -> ReviewOutcome {
    ReviewOutcome {
        card_id: card.id,
        grade,
        pool,
        due_at,
        interval: card.interval,
        repetition: card.repetition,
        easiness: card.easiness,
    }
}
