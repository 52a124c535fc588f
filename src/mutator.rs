// Applies a resolved asset set to an album. Requests are chunked by
// `Config::batch_size`; counts are aggregated per asset ID so a chunk
// boundary can never count an asset twice. In dry-run mode nothing is
// created or added, but read-only lookups still happen.

use std::collections::HashSet;

use crate::albums::AlbumDirectory;
use crate::api::ImmichApi;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Album, AlbumTarget, AssetId, AssetIdSet, MutationResult};

/// What `apply` did to the chosen album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// `None` only for a dry run against an album that does not exist yet.
    pub album: Option<Album>,
    pub created: bool,
    pub result: MutationResult,
}

pub struct AlbumMutator<'a, A: ImmichApi + ?Sized> {
    config: &'a Config,
    api: &'a A,
}

impl<'a, A: ImmichApi + ?Sized> AlbumMutator<'a, A> {
    pub fn new(config: &'a Config, api: &'a A) -> Self {
        Self { config, api }
    }

    fn hypothetical(&self, ids: &AssetIdSet) -> MutationResult {
        MutationResult {
            added: ids.len(),
            dry_run: true,
            ..MutationResult::default()
        }
    }

    /// Add `ids` to the album. An empty set is a no-op.
    ///
    /// A chunk the server rejects as a whole lands in `failed` and the
    /// remaining chunks are still sent; only an auth error aborts.
    pub fn add_assets(&self, album_id: &str, ids: &AssetIdSet) -> Result<MutationResult> {
        if ids.is_empty() {
            return Ok(MutationResult {
                dry_run: self.config.dry_run,
                ..MutationResult::default()
            });
        }
        if self.config.dry_run {
            tracing::info!(album_id, count = ids.len(), "dry run: not adding assets");
            return Ok(self.hypothetical(ids));
        }

        let mut result = MutationResult::default();
        let mut counted: HashSet<AssetId> = HashSet::with_capacity(ids.len());

        for chunk in ids.chunks(self.config.batch_size) {
            let outcomes = match self.api.add_assets(album_id, chunk) {
                Ok(outcomes) => outcomes,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    // Earlier chunks are already applied; keep their counts
                    // and report this chunk as failed.
                    tracing::warn!(album_id, count = chunk.len(), error = %e, "add request failed");
                    for id in chunk {
                        counted.insert(id.clone());
                        result.failed.insert(id.clone());
                    }
                    continue;
                }
            };
            for outcome in outcomes {
                if !ids.contains(&outcome.id) || !counted.insert(outcome.id.clone()) {
                    continue;
                }
                if outcome.success {
                    result.added += 1;
                } else if outcome.is_duplicate() {
                    result.already_present += 1;
                } else {
                    tracing::warn!(
                        id = %outcome.id,
                        error = outcome.error.as_deref().unwrap_or("unknown"),
                        "server refused asset"
                    );
                    result.failed.insert(outcome.id);
                }
            }
        }

        // The server answers for every ID it was sent; anything missing
        // is reported as failed rather than silently dropped.
        for id in ids {
            if !counted.contains(id) {
                result.failed.insert(id.clone());
            }
        }

        tracing::info!(
            album_id,
            added = result.added,
            already_present = result.already_present,
            failed = result.failed.len(),
            "added assets"
        );
        Ok(result)
    }

    /// Add `ids` to the target, creating the album first when needed.
    pub fn apply(&self, target: &AlbumTarget, ids: &AssetIdSet) -> Result<Applied> {
        match target {
            AlbumTarget::Existing(album) => Ok(Applied {
                album: Some(album.clone()),
                created: false,
                result: self.add_assets(&album.id, ids)?,
            }),
            AlbumTarget::New { name } => {
                if ids.is_empty() {
                    return Err(Error::EmptyAssetSet);
                }
                let directory = AlbumDirectory::new(self.api);
                if self.config.dry_run {
                    directory.check_available(name)?;
                    tracing::info!(name = %name, "dry run: not creating album");
                    return Ok(Applied {
                        album: None,
                        created: false,
                        result: self.hypothetical(ids),
                    });
                }
                let album = directory.create_album(name)?;
                let result =
                    self.add_assets(&album.id, ids)
                        .map_err(|e| Error::CreatedButNotFilled {
                            name: album.album_name.clone(),
                            source: Box::new(e),
                        })?;
                Ok(Applied {
                    album: Some(album),
                    created: true,
                    result,
                })
            }
        }
    }
}
