// In-memory stand-in for the server, used by the unit tests. Records
// every request so tests can assert on what was (not) sent.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use reqwest::StatusCode;

use crate::api::{BulkIdResponse, FolderListing, ImmichApi};
use crate::error::{Error, Result};
use crate::model::{Album, AssetId};
use crate::path::RelativePath;

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Unavailable,
    Status(StatusCode),
}

impl Failure {
    fn to_error(self) -> Error {
        match self {
            Failure::Unavailable => Error::RemoteUnavailable("connection refused".into()),
            Failure::Status(status)
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                Error::Auth { status }
            }
            Failure::Status(status) => Error::Remote {
                status,
                body: "fake failure".into(),
            },
        }
    }
}

#[derive(Default)]
pub struct FakeImmich {
    folders: HashMap<String, FolderListing>,
    folder_failures: HashMap<String, Failure>,
    forbidden: HashSet<AssetId>,
    echoed: HashSet<AssetId>,
    unanswered: HashSet<AssetId>,
    add_failures: HashMap<usize, Failure>,
    albums: RefCell<Vec<Album>>,
    members: RefCell<HashMap<String, HashSet<AssetId>>>,
    next_album: Cell<usize>,
    pub folder_queries: RefCell<Vec<String>>,
    pub album_lists: Cell<usize>,
    pub creates: Cell<usize>,
    pub add_requests: RefCell<Vec<usize>>,
}

impl FakeImmich {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(mut self, path: &str, assets: &[&str], folders: &[&str]) -> Self {
        self.folders.insert(
            path.to_string(),
            FolderListing {
                assets: assets.iter().map(|a| AssetId::from(*a)).collect(),
                folders: folders.iter().map(|f| f.to_string()).collect(),
            },
        );
        self
    }

    pub fn with_failing_folder(mut self, path: &str, failure: Failure) -> Self {
        self.folder_failures.insert(path.to_string(), failure);
        self
    }

    pub fn with_album(self, id: &str, name: &str) -> Self {
        self.albums.borrow_mut().push(Album {
            id: id.to_string(),
            album_name: name.to_string(),
            asset_count: Some(0),
        });
        self.members.borrow_mut().insert(id.to_string(), HashSet::new());
        self
    }

    /// Assets the server refuses to add with `no_permission`.
    pub fn with_forbidden_asset(mut self, id: &str) -> Self {
        self.forbidden.insert(AssetId::from(id));
        self
    }

    /// Assets the server answers for twice in the same response.
    pub fn with_echoed_asset(mut self, id: &str) -> Self {
        self.echoed.insert(AssetId::from(id));
        self
    }

    /// Assets the server adds but leaves out of its response.
    pub fn with_unanswered_asset(mut self, id: &str) -> Self {
        self.unanswered.insert(AssetId::from(id));
        self
    }

    /// Make the `call`-th add-assets request (1-based) fail.
    pub fn with_failing_add(mut self, call: usize, failure: Failure) -> Self {
        self.add_failures.insert(call, failure);
        self
    }

    pub fn add_request_count(&self) -> usize {
        self.add_requests.borrow().len()
    }

    pub fn album_count(&self) -> usize {
        self.albums.borrow().len()
    }

    pub fn members_of(&self, album_id: &str) -> HashSet<AssetId> {
        self.members
            .borrow()
            .get(album_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl ImmichApi for FakeImmich {
    fn folder(&self, path: &RelativePath) -> Result<FolderListing> {
        self.folder_queries.borrow_mut().push(path.as_str().to_string());
        if let Some(failure) = self.folder_failures.get(path.as_str()) {
            return Err(failure.to_error());
        }
        Ok(self.folders.get(path.as_str()).cloned().unwrap_or_default())
    }

    fn albums(&self) -> Result<Vec<Album>> {
        self.album_lists.set(self.album_lists.get() + 1);
        Ok(self.albums.borrow().clone())
    }

    fn create_album(&self, name: &str) -> Result<Album> {
        self.creates.set(self.creates.get() + 1);
        let n = self.next_album.get() + 1;
        self.next_album.set(n);
        let album = Album {
            id: format!("new-{n}"),
            album_name: name.to_string(),
            asset_count: Some(0),
        };
        self.albums.borrow_mut().push(album.clone());
        self.members.borrow_mut().insert(album.id.clone(), HashSet::new());
        Ok(album)
    }

    fn add_assets(&self, album_id: &str, ids: &[AssetId]) -> Result<Vec<BulkIdResponse>> {
        self.add_requests.borrow_mut().push(ids.len());
        let call = self.add_requests.borrow().len();
        if let Some(failure) = self.add_failures.get(&call) {
            return Err(failure.to_error());
        }
        let mut members = self.members.borrow_mut();
        let album = members.get_mut(album_id).ok_or_else(|| Error::Remote {
            status: StatusCode::BAD_REQUEST,
            body: format!("album {album_id} not found"),
        })?;
        let mut answers = Vec::with_capacity(ids.len());
        for id in ids {
            let (success, error) = if self.forbidden.contains(id) {
                (false, Some("no_permission".to_string()))
            } else if album.insert(id.clone()) {
                (true, None)
            } else {
                (false, Some("duplicate".to_string()))
            };
            if self.unanswered.contains(id) {
                continue;
            }
            let answer = BulkIdResponse {
                id: id.clone(),
                success,
                error,
            };
            if self.echoed.contains(id) {
                answers.push(answer.clone());
            }
            answers.push(answer);
        }
        Ok(answers)
    }
}
