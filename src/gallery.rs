//! Photo listings built from the image folders under the public directory.
//!
//! Folders may also hold `*-optimized.*` derivatives and a background image
//! for the page; neither is shown in the grid. A missing or unreadable folder
//! lists as empty.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use rocket::tokio::fs;
use serde::Serialize;

const IMAGE_EXTENSIONS: &str = "jpe?g|png|gif|webp|avif";

static IMAGE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\.({IMAGE_EXTENSIONS})$")).expect("valid regex"));

static OPTIMIZED_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)-optimized\.({IMAGE_EXTENSIONS})$")).expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gallery {
    pub slug: &'static str,
    pub title: &'static str,
    /// Relative to the public directory, and to the site root in URLs.
    pub directory: &'static str,
    /// `<stem>-bg.*` files are page backgrounds.
    pub background_stems: &'static [&'static str],
    pub body_class: &'static str,
}

pub const GALLERIES: [Gallery; 2] = [
    Gallery {
        slug: "wedding",
        title: "Gallery",
        directory: "images/gallery/wedding",
        background_stems: &["gallery", "wedding"],
        body_class: "page-gallery-bg",
    },
    Gallery {
        slug: "proposal",
        title: "Proposal Gallery",
        directory: "images/gallery/proposal",
        background_stems: &["proposal"],
        body_class: "page-proposal-bg",
    },
];

pub fn find(slug: &str) -> Option<&'static Gallery> {
    GALLERIES.iter().find(|g| g.slug == slug)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GalleryListing {
    pub images: Vec<String>,
    pub background: Option<String>,
}

fn is_background(name: &str, stems: &[&str]) -> bool {
    let lower = name.to_lowercase();
    stems.iter().any(|stem| {
        lower
            .strip_prefix(stem)
            .and_then(|rest| rest.strip_prefix("-bg."))
            .is_some()
    })
}

/// Gallery images only, in natural order.
pub fn select_images<I>(names: I, stems: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut images: Vec<String> = names
        .into_iter()
        .filter(|name| IMAGE_FILE.is_match(name))
        .filter(|name| !OPTIMIZED_FILE.is_match(name))
        .filter(|name| !is_background(name, stems))
        .collect();
    images.sort_by(|a, b| natural_cmp(a, b));
    images
}

/// Case-insensitive comparison that orders digit runs by value, so
/// `img2` sorts before `img10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_number(&mut a);
                let right = take_number(&mut b);
                let ord = left
                    .trim_start_matches('0')
                    .len()
                    .cmp(&right.trim_start_matches('0').len())
                    .then_with(|| {
                        left.trim_start_matches('0')
                            .cmp(right.trim_start_matches('0'))
                    });
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    digits
}

async fn file_names(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    Ok(names)
}

fn url_for(directory: &str, name: &str) -> String {
    format!("/{directory}/{name}")
}

pub async fn list(public_dir: &Path, gallery: &Gallery) -> GalleryListing {
    let names = match file_names(&public_dir.join(gallery.directory)).await {
        Ok(names) => names,
        Err(e) => {
            tracing::debug!(gallery = gallery.slug, error = %e, "gallery folder unreadable");
            return GalleryListing::default();
        }
    };

    let mut backgrounds: Vec<&String> = names
        .iter()
        .filter(|name| IMAGE_FILE.is_match(name) && is_background(name, gallery.background_stems))
        .collect();
    backgrounds.sort_by(|a, b| natural_cmp(a, b));
    let background = backgrounds.first().map(|name| url_for(gallery.directory, name));

    let images: Vec<String> = select_images(names.iter().cloned(), gallery.background_stems)
        .iter()
        .map(|name| url_for(gallery.directory, name))
        .collect();

    GalleryListing {
        background: background.or_else(|| images.first().cloned()),
        images,
    }
}

/// Background for a content page such as the FAQ: `faq-bg.jpg`,
/// `faq background.png`, `faqbackground.webp`, `faq-bg-image.avif`, ...
pub async fn page_background(public_dir: &Path, directory: &str, stem: &str) -> Option<String> {
    let pattern = Regex::new(&format!(
        r"(?i)^({stem}[- _]?bg|{stem}[- _]?background|{stem}background|{stem}[- _]?bg[- _]?image)\.({IMAGE_EXTENSIONS})$",
        stem = regex::escape(stem),
    ))
    .ok()?;

    let mut names = file_names(&public_dir.join(directory)).await.ok()?;
    names.sort_by(|a, b| natural_cmp(a, b));
    names
        .iter()
        .find(|name| pattern.is_match(name))
        .map(|name| url_for(directory, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn natural_order_compares_numbers_by_value() {
        let mut files = names(&["IMG10.jpg", "img2.jpg", "img1.JPG", "img02b.jpg"]);
        files.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(files, ["img1.JPG", "img2.jpg", "img02b.jpg", "IMG10.jpg"]);
    }

    #[test]
    fn selection_drops_derivatives_and_backgrounds() {
        let selected = select_images(
            names(&[
                "b.png",
                "a.jpeg",
                "a-medium-optimized.webp",
                "a-optimized.JPG",
                "Proposal-bg.jpg",
                "notes.txt",
                "c.AVIF",
            ]),
            &["proposal"],
        );
        assert_eq!(selected, ["a.jpeg", "b.png", "c.AVIF"]);
    }

    #[rocket::async_test]
    async fn listing_reads_folder_and_picks_background() {
        let public = tempfile::tempdir().unwrap();
        let gallery = find("proposal").unwrap();
        let dir = public.path().join(gallery.directory);
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["photo10.jpg", "photo9.jpg", "proposal-bg.png", "photo9-optimized.webp"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }

        let listing = list(public.path(), gallery).await;
        assert_eq!(
            listing.images,
            [
                "/images/gallery/proposal/photo9.jpg",
                "/images/gallery/proposal/photo10.jpg"
            ]
        );
        assert_eq!(
            listing.background.as_deref(),
            Some("/images/gallery/proposal/proposal-bg.png")
        );
    }

    #[rocket::async_test]
    async fn missing_folder_lists_nothing() {
        let public = tempfile::tempdir().unwrap();
        let listing = list(public.path(), find("wedding").unwrap()).await;
        assert_eq!(listing, GalleryListing::default());
    }

    #[rocket::async_test]
    async fn first_image_stands_in_for_missing_background() {
        let public = tempfile::tempdir().unwrap();
        let gallery = find("wedding").unwrap();
        let dir = public.path().join(gallery.directory);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b.jpg"), b"").unwrap();
        std::fs::write(dir.join("a.jpg"), b"").unwrap();

        let listing = list(public.path(), gallery).await;
        assert_eq!(
            listing.background.as_deref(),
            Some("/images/gallery/wedding/a.jpg")
        );
    }

    #[rocket::async_test]
    async fn page_background_accepts_naming_variants() {
        let public = tempfile::tempdir().unwrap();
        let dir = public.path().join("images/gallery/faq");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("FAQ Background.webp"), b"").unwrap();

        let found = page_background(public.path(), "images/gallery/faq", "faq").await;
        assert_eq!(
            found.as_deref(),
            Some("/images/gallery/faq/FAQ Background.webp")
        );
        assert!(page_background(public.path(), "images/gallery/registry", "registry")
            .await
            .is_none());
    }
}
