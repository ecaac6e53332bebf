//! Listing photos, backed by the external media store.
//!
//! The photo quota is checked before any upload leaves this contract, and a
//! failed upload aborts the invocation so the listing keeps its old images.

use crate::clock;
use crate::entitlements::can_add_photos;
use crate::external::MediaStoreClient;
use crate::listing::owned_listing;
use crate::state_machine::effective_features;
use crate::storage;
use crate::subscription::reconciled_seller;
use crate::types::{Error, HorseImage};
use soroban_sdk::{log, Address, Bytes, Env, Symbol, Vec};

pub fn do_add_photos(
    env: &Env,
    owner: Address,
    listing_id: u32,
    contents: Vec<Bytes>,
) -> Result<Vec<HorseImage>, Error> {
    owner.require_auth();
    if contents.is_empty() {
        return Err(Error::InvalidInput);
    }
    let now = clock::now(env);
    let seller = reconciled_seller(env, &owner, now)?;
    let mut listing = owned_listing(env, &owner, listing_id)?;

    let features = effective_features(env, &seller.subscription);
    can_add_photos(&features, listing.images.len(), contents.len()).require()?;

    let store = MediaStoreClient::new(env, &storage::config(env)?.media_store);
    let mut added = Vec::new(env);
    for content in contents.iter() {
        let asset = store.upload(&content);
        let image = HorseImage {
            id: listing.next_image_id,
            url: asset.url,
            public_id: asset.public_id,
            width: asset.width,
            height: asset.height,
            format: asset.format,
        };
        listing.next_image_id = listing
            .next_image_id
            .checked_add(1)
            .ok_or(Error::Overflow)?;
        listing.images.push_back(image.clone());
        added.push_back(image);
    }
    storage::save_listing(env, &listing);

    log!(env, "photos added to listing {}: {}", listing_id, added.len());
    env.events().publish(
        (Symbol::new(env, "photos_added"), owner),
        (listing_id, added.len()),
    );
    Ok(added)
}

pub fn do_remove_photo(
    env: &Env,
    owner: Address,
    listing_id: u32,
    image_id: u32,
) -> Result<(), Error> {
    owner.require_auth();
    let mut listing = owned_listing(env, &owner, listing_id)?;
    let index = listing
        .images
        .iter()
        .position(|img| img.id == image_id)
        .ok_or(Error::ImageNotFound)? as u32;
    let image = listing.images.get(index).ok_or(Error::ImageNotFound)?;

    let store = MediaStoreClient::new(env, &storage::config(env)?.media_store);
    store.delete(&image.public_id);

    listing.images.remove(index);
    storage::save_listing(env, &listing);
    env.events().publish(
        (Symbol::new(env, "photo_removed"), owner),
        (listing_id, image_id),
    );
    Ok(())
}

/// Reorders the images of a listing. `order` must name every image id exactly once.
pub fn do_reorder_photos(
    env: &Env,
    owner: Address,
    listing_id: u32,
    order: Vec<u32>,
) -> Result<Vec<HorseImage>, Error> {
    owner.require_auth();
    let mut listing = owned_listing(env, &owner, listing_id)?;
    listing.images = reordered(env, &listing.images, &order)?;
    storage::save_listing(env, &listing);
    Ok(listing.images)
}

fn reordered(env: &Env, images: &Vec<HorseImage>, order: &Vec<u32>) -> Result<Vec<HorseImage>, Error> {
    if order.len() != images.len() {
        return Err(Error::InvalidInput);
    }
    let mut out = Vec::new(env);
    for (i, id) in order.iter().enumerate() {
        if order.iter().take(i).any(|seen| seen == id) {
            return Err(Error::InvalidInput);
        }
        let image = images
            .iter()
            .find(|img| img.id == id)
            .ok_or(Error::InvalidInput)?;
        out.push_back(image);
    }
    Ok(out)
}
