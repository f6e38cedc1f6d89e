//! Command orchestration: parse, resolve, allocate, mutate, respond.
//!
//! # Responsibility
//! - Dispatch each decoded `Command` to its workflow.
//! - Sequence the multi-step insert and bundle flows over the repository.
//! - Turn every failure into the command's response shape.
//!
//! # Invariants
//! - `execute` never returns an error and never panics on bad input.
//! - An item is only written with coordinates from the allocator or from
//!   the item it is bundled with.
//! - Ambiguous bundle targets fail closed without writing.
//! - Log events carry metadata only; the one exception is a capped echo
//!   of an unrecognized command name.

use crate::command::phrase::{parse_add_tags, parse_bundle, parse_item_info, BundleTarget};
use crate::command::{Command, CommandKind};
use crate::config::OrganizerConfig;
use crate::grid::allocator::BoxAllocator;
use crate::logging::sanitize_message;
use crate::model::item::{CanonicalKey, Item};
use crate::protocol::response::{
    AddTagsResponse, BundleWithResponse, CommandResponse, FindItemResponse, FindTagsResponse,
    HowManyResponse, InsertItemResponse, RemoveItemResponse, ShowAllBoxesResponse,
    UnknownCommandResponse,
};
use crate::repo::item_repo::{ItemRepository, RepoError};
use crate::search::rank::{rank_by_tags, FullMatch, RankOutcome};
use crate::text::tagger::{TagSet, Tagger};
use log::{error, info, warn};
use std::time::Instant;
use uuid::Uuid;

const MAX_LOGGED_COMMAND_CHARS: usize = 40;

/// Quantity mutation requested by `SetQuantity` / `UpdateQuantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Set(i64),
    Delta(i64),
}

/// Organizer facade over a repository implementation.
pub struct OrganizerService<R: ItemRepository> {
    repo: R,
    tagger: Tagger,
    config: OrganizerConfig,
}

impl<R: ItemRepository> OrganizerService<R> {
    pub fn new(repo: R, tagger: Tagger, config: OrganizerConfig) -> Self {
        Self {
            repo,
            tagger,
            config,
        }
    }

    /// Decodes a JSON request document and executes it.
    pub fn handle_request(&mut self, request: &str) -> CommandResponse {
        self.execute(Command::from_json_str(request))
    }

    /// Runs one command to completion.
    ///
    /// # Side effects
    /// - May write to the repository.
    /// - Emits one `command_execute` event with a fresh `request_id`.
    pub fn execute(&mut self, command: Command) -> CommandResponse {
        let request_id = Uuid::new_v4();
        let started_at = Instant::now();
        let kind = command.kind();

        let response: CommandResponse = match command {
            Command::FindItem { item } => self.find_item(&item).into(),
            Command::FindTags { text } => self.find_tags(&text).into(),
            Command::InsertItem { info, quantity } => self.insert_item(&info, quantity).into(),
            Command::RemoveItem { item } => self.remove_item(&item).into(),
            Command::AddTags { text } => self.add_tags(&text).into(),
            Command::UpdateQuantity {
                item,
                quantity,
                add,
            } => {
                let delta = if add {
                    Some(quantity)
                } else {
                    quantity.checked_neg()
                };
                match delta {
                    Some(delta) => self
                        .change_quantity(
                            CommandKind::UpdateQuantity,
                            &item,
                            QuantityChange::Delta(delta),
                        )
                        .into(),
                    None => FindItemResponse::not_found(CommandKind::UpdateQuantity, item).into(),
                }
            }
            Command::SetQuantity { item, quantity } => self
                .change_quantity(CommandKind::SetQuantity, &item, QuantityChange::Set(quantity))
                .into(),
            Command::ShowAllBoxes => self.show_all_boxes().into(),
            Command::BundleWith { info, quantity } => self.bundle_with(&info, quantity).into(),
            Command::HowMany { item } => self.how_many(&item).into(),
            Command::Unknown { command, reason } => {
                warn!(
                    "event=command_rejected module=service status=rejected request_id={} reason={} command={}",
                    request_id,
                    reason.as_str(),
                    sanitize_message(&command, MAX_LOGGED_COMMAND_CHARS)
                );
                UnknownCommandResponse::new(command, reason).into()
            }
        };

        info!(
            "event=command_execute module=service status=ok request_id={} command={} success={} duration_ms={}",
            request_id,
            kind.as_str(),
            response.success(),
            started_at.elapsed().as_millis()
        );
        response
    }

    /// Exact-name lookup, falling back to tag ranking on a miss.
    pub fn find_item(&self, item: &str) -> FindItemResponse {
        let Some(key) = self.key(item) else {
            return FindItemResponse::not_found(CommandKind::FindItem, item);
        };

        match self.repo.find_items(&key) {
            Ok(items) if !items.is_empty() => {
                return FindItemResponse::found(CommandKind::FindItem, summaries(&items));
            }
            Ok(_) => {}
            Err(err) => {
                log_repo_error("find_item", &err);
                return FindItemResponse::not_found(CommandKind::FindItem, item);
            }
        }

        let tags = self.tagger.normalize(item);
        let hits = self
            .rank(&tags, self.config.ranking.find_item_fallback_limit)
            .into_hits();
        if hits.is_empty() {
            return FindItemResponse::not_found(CommandKind::FindItem, item);
        }
        let items = hits.iter().map(|hit| hit.item.summary()).collect();
        FindItemResponse::fuzzy(items)
    }

    pub fn find_tags(&self, text: &str) -> FindTagsResponse {
        let tags = self.tagger.normalize(text);
        let outcome = self.rank(&tags, self.config.ranking.find_tags_limit);
        FindTagsResponse::from_outcome(&outcome)
    }

    /// Stores a new item in a free box, or reports where it already is.
    ///
    /// Accepted forms:
    /// - `"<item>"`
    /// - `"<item> into a <small|big> box with tags <tags>"`
    /// - `"<item> with tags <tags> into a <small|big> box"`
    pub fn insert_item(&mut self, info: &str, quantity: i64) -> InsertItemResponse {
        let parsed = parse_item_info(info, &self.tagger);
        let Some(key) = self.key(&parsed.item_name) else {
            return InsertItemResponse::failed(None);
        };
        let name = parsed.item_name.clone();

        match self.repo.find_items(&key) {
            Ok(items) => {
                if let Some(existing) = items.first() {
                    return InsertItemResponse::existing(existing);
                }
            }
            Err(err) => {
                log_repo_error("insert_item_lookup", &err);
                return InsertItemResponse::failed(Some(name));
            }
        }

        let occupied = match self.repo.occupied_cells() {
            Ok(cells) => cells,
            Err(err) => {
                log_repo_error("insert_item_scan", &err);
                return InsertItemResponse::failed(Some(name));
            }
        };

        let size = parsed.size_or_default();
        let mut allocator = BoxAllocator::with_occupied(self.config.grid, occupied);
        let Some(cell) = allocator.allocate(size) else {
            warn!(
                "event=box_allocate module=service status=exhausted size={} capacity={}",
                size.as_str(),
                self.config.grid.capacity(size)
            );
            return InsertItemResponse::failed(Some(name));
        };

        let mut tags = parsed.tags;
        self.tagger.union(&mut tags, &name);
        let item = Item::placed(name.as_str(), quantity, cell.cell_ref(), size);

        match self.repo.insert_item_with_tags(&key, &item, &tags) {
            Ok(_) => InsertItemResponse::inserted(name, cell.cell_ref()),
            Err(err) => {
                log_repo_error("insert_item_write", &err);
                InsertItemResponse::failed(Some(name))
            }
        }
    }

    /// Deletes an item with all its tags and returns the freed box.
    pub fn remove_item(&mut self, item: &str) -> RemoveItemResponse {
        let Some(key) = self.key(item) else {
            return RemoveItemResponse::failed(item);
        };

        let found = match self.repo.find_items(&key) {
            Ok(found) => found,
            Err(err) => {
                log_repo_error("remove_item_lookup", &err);
                return RemoveItemResponse::failed(item);
            }
        };
        let Some(target) = found.first() else {
            return RemoveItemResponse::failed(item);
        };

        match self.repo.delete_item_and_tags(&key) {
            Ok(removed) if removed > 0 => RemoveItemResponse::removed(item, target.cell()),
            Ok(_) => RemoveItemResponse::failed(item),
            Err(err) => {
                log_repo_error("remove_item_write", &err);
                RemoveItemResponse::failed(item)
            }
        }
    }

    /// Links extra tags to an existing item.
    ///
    /// Accepted forms: `"<tags> to <item>"`, `"<item> add tags <tags>"`,
    /// `"<item> with tags <tags>"`.
    pub fn add_tags(&mut self, text: &str) -> AddTagsResponse {
        let Some(request) = parse_add_tags(text, &self.tagger) else {
            return AddTagsResponse::failed(None);
        };
        let Some(key) = self.key(&request.item) else {
            return AddTagsResponse::failed(Some(request.item));
        };

        match self.repo.item_exists(&key) {
            Ok(true) => {}
            Ok(false) => return AddTagsResponse::failed(Some(request.item)),
            Err(err) => {
                log_repo_error("add_tags_lookup", &err);
                return AddTagsResponse::failed(Some(request.item));
            }
        }

        match self.repo.insert_tags_if_absent(&key, &request.tags) {
            Ok(added) => AddTagsResponse::added(request.item, added),
            Err(err) => {
                log_repo_error("add_tags_write", &err);
                AddTagsResponse::failed(Some(request.item))
            }
        }
    }

    /// Applies a quantity change and returns the item for display.
    pub fn change_quantity(
        &mut self,
        command: CommandKind,
        item: &str,
        change: QuantityChange,
    ) -> FindItemResponse {
        let Some(key) = self.key(item) else {
            return FindItemResponse::not_found(command, item);
        };

        let changed = match change {
            QuantityChange::Set(quantity) => self.repo.set_quantity(&key, quantity),
            QuantityChange::Delta(delta) => self.repo.adjust_quantity(&key, delta),
        };
        match changed {
            Ok(0) => return FindItemResponse::not_found(command, item),
            Ok(_) => {}
            Err(err) => {
                log_repo_error("change_quantity_write", &err);
                return FindItemResponse::not_found(command, item);
            }
        }

        match self.repo.find_items(&key) {
            Ok(items) if !items.is_empty() => FindItemResponse::found(command, summaries(&items)),
            Ok(_) => FindItemResponse::not_found(command, item),
            Err(err) => {
                log_repo_error("change_quantity_readback", &err);
                FindItemResponse::not_found(command, item)
            }
        }
    }

    pub fn show_all_boxes(&self) -> ShowAllBoxesResponse {
        match self.repo.occupied_cells() {
            Ok(cells) => ShowAllBoxesResponse::from_cells(&cells),
            Err(err) => {
                log_repo_error("show_all_boxes", &err);
                ShowAllBoxesResponse::failed()
            }
        }
    }

    /// Stores a new item in the same box as an existing one.
    ///
    /// Accepted forms:
    /// - `"<new item> with <existing item> [add tags <tags>]"`
    /// - `"<new item> with tags <tags of existing item>"`
    pub fn bundle_with(&mut self, info: &str, quantity: i64) -> BundleWithResponse {
        let Some(request) = parse_bundle(info, &self.tagger) else {
            return BundleWithResponse::failed();
        };
        let Some(new_key) = self.key(&request.new_item) else {
            return BundleWithResponse::failed();
        };

        let mut tags = self.tagger.normalize(&request.new_item);
        let existing = match request.target {
            BundleTarget::Item {
                existing_item,
                extra_tags,
            } => {
                tags.extend(&extra_tags);
                self.resolve_named(&existing_item)
            }
            BundleTarget::Tags { tags: target_tags } => self.resolve_tagged(&target_tags),
        };
        let Some(existing) = existing else {
            return BundleWithResponse::failed();
        };

        let (Some(cell), Some(size)) = (existing.cell(), existing.size_class()) else {
            warn!("event=bundle_resolve module=service status=error error_code=target_unplaced");
            return BundleWithResponse::failed();
        };

        let item = Item::placed(request.new_item.as_str(), quantity, cell, size);
        match self.repo.insert_item_with_tags(&new_key, &item, &tags) {
            Ok(_) => BundleWithResponse::bundled(&request.new_item, quantity, &existing.name, cell),
            Err(err) => {
                log_repo_error("bundle_with_write", &err);
                BundleWithResponse::not_stored(&request.new_item, quantity, &existing.name)
            }
        }
    }

    pub fn how_many(&self, item: &str) -> HowManyResponse {
        let Some(key) = self.key(item) else {
            return HowManyResponse::failed(item);
        };
        match self.repo.find_items(&key) {
            Ok(items) if items.len() == 1 => HowManyResponse::counted(&items[0]),
            Ok(_) => HowManyResponse::failed(item),
            Err(err) => {
                log_repo_error("how_many", &err);
                HowManyResponse::failed(item)
            }
        }
    }

    /// Ranks stored items by overlap with `tags`.
    ///
    /// A failed tag query degrades to an empty ranking.
    pub fn rank(&self, tags: &TagSet, limit: usize) -> RankOutcome {
        if tags.is_empty() {
            return RankOutcome::NoQuery;
        }
        let candidates = self.repo.tag_matches(tags).unwrap_or_else(|err| {
            log_repo_error("tag_matches", &err);
            Vec::new()
        });
        rank_by_tags(tags, candidates, limit)
    }

    fn resolve_named(&self, existing_item: &str) -> Option<Item> {
        let key = self.key(existing_item)?;
        match self.repo.find_items(&key) {
            Ok(mut found) if found.len() == 1 => found.pop(),
            Ok(found) => {
                info!(
                    "event=bundle_resolve module=service status=unresolved mode=item candidates={}",
                    found.len()
                );
                None
            }
            Err(err) => {
                log_repo_error("bundle_resolve_item", &err);
                None
            }
        }
    }

    fn resolve_tagged(&self, target_tags: &TagSet) -> Option<Item> {
        let outcome = self.rank(target_tags, self.config.ranking.bundle_candidate_limit);
        match outcome.fully_matched() {
            FullMatch::Unique(hit) => Some(hit.item.clone()),
            FullMatch::Ambiguous(candidates) => {
                info!(
                    "event=bundle_resolve module=service status=ambiguous mode=tags candidates={}",
                    candidates
                );
                None
            }
            FullMatch::None => {
                info!(
                    "event=bundle_resolve module=service status=unresolved mode=tags candidates=0"
                );
                None
            }
        }
    }

    fn key(&self, name: &str) -> Option<CanonicalKey> {
        CanonicalKey::derive(name, &self.tagger.singularizer())
    }
}

fn summaries(items: &[Item]) -> Vec<Item> {
    items.iter().map(Item::summary).collect()
}

fn log_repo_error(operation: &str, err: &RepoError) {
    error!(
        "event=repo_call module=service status=error operation={} error={}",
        operation, err
    );
}
