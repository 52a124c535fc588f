// Album lookup and creation. Names are compared exactly (case-sensitive);
// the server does not enforce uniqueness itself, so the check happens
// here before a create request is sent.

use crate::api::ImmichApi;
use crate::error::{Error, Result};
use crate::model::Album;

pub struct AlbumDirectory<'a, A: ImmichApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: ImmichApi + ?Sized> AlbumDirectory<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Every album visible to the API key, in server order.
    pub fn list_albums(&self) -> Result<Vec<Album>> {
        let albums = self.api.albums()?;
        tracing::debug!(count = albums.len(), "fetched albums");
        Ok(albums)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Album>> {
        Ok(self
            .list_albums()?
            .into_iter()
            .find(|album| album.album_name == name))
    }

    /// Check that `name` could be used for a new album without creating
    /// anything.
    pub fn check_available(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::InvalidAlbumName);
        }
        if self.find_by_name(name)?.is_some() {
            return Err(Error::NameConflict {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Create an empty album. Fails with `NameConflict`, without sending
    /// the create request, when the name is taken.
    pub fn create_album(&self, name: &str) -> Result<Album> {
        self.check_available(name)?;
        let album = self.api.create_album(name)?;
        tracing::info!(id = %album.id, name = %album.album_name, "created album");
        Ok(album)
    }
}
