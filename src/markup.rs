//! HTML composition for rendered directives.
//!
//! One pipeline serves three shapes of output, picked by [`Composition`]:
//!
//! ```text
//! Img          <img src="/generated/poster-400x300-1a2b3c.jpg" alt="Poster" >
//!
//! Picture      <picture class="hero" >
//!              <source src="/generated/hero-1200x800-1a2b3c.jpg">
//!              <source src="/generated/hero-600x400-1a2b3c.jpg" media="(max-width: 600px)">
//!              <p>Hero</p>
//!              </picture>
//!
//! Picturefill  <span data-picture data-alt="Hero" >
//!              <span data-src="/generated/hero-600x400-1a2b3c.jpg" data-media="(max-width: 600px)"></span>
//!              <span data-src="/generated/hero-1200x800-1a2b3c.jpg"></span>
//!              <noscript>
//!              <img src="/generated/hero-1200x800-1a2b3c.jpg" alt="Hero">
//!              </noscript>
//!              </span>
//! ```
//!
//! `<picture>` lists sources in declared order; picturefill lists them in
//! reverse, since its script picks the last matching entry. The `default`
//! source never carries a media query. Inner elements are built with Maud, so
//! URLs and media queries are escaped.

use crate::attrs::AttributeSet;
use crate::config::DEFAULT_SOURCE;
use maud::html;
use serde::{Deserialize, Serialize};

/// Markup for responsive directives, chosen in config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupStyle {
    #[default]
    Picture,
    Picturefill,
}

/// The shape of markup a directive renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    Img,
    Picture,
    Picturefill,
}

impl From<MarkupStyle> for Composition {
    fn from(style: MarkupStyle) -> Self {
        match style {
            MarkupStyle::Picture => Composition::Picture,
            MarkupStyle::Picturefill => Composition::Picturefill,
        }
    }
}

/// A generated image ready for markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedSource {
    pub name: String,
    pub url: String,
    pub media: Option<String>,
}

impl ComposedSource {
    fn is_default(&self) -> bool {
        self.name == DEFAULT_SOURCE
    }

    /// Media query to emit; `None` for the default source.
    fn media_attr(&self) -> Option<&str> {
        if self.is_default() {
            None
        } else {
            self.media.as_deref()
        }
    }
}

/// Build the markup for `sources` (in declared order) with merged `attrs`.
pub fn compose(
    composition: Composition,
    attrs: &AttributeSet,
    sources: &[ComposedSource],
) -> String {
    match composition {
        Composition::Img => compose_img(attrs, sources),
        Composition::Picture => compose_picture(attrs, sources),
        Composition::Picturefill => compose_picturefill(attrs, sources),
    }
}

fn compose_img(attrs: &AttributeSet, sources: &[ComposedSource]) -> String {
    let Some(source) = sources.first() else {
        return String::new();
    };
    let src = html! { (source.url) }.into_string();
    format!("<img src=\"{src}\" {}>", attrs.render())
}

fn compose_picture(attrs: &AttributeSet, sources: &[ComposedSource]) -> String {
    let mut out = format!("<picture {}>\n", attrs.render());
    for entry in sources {
        let tag = html! { source src=(entry.url) media=[entry.media_attr()]; };
        out.push_str(&tag.into_string());
        out.push('\n');
    }
    let fallback = html! { p { (attrs.value("alt").unwrap_or_default()) } };
    out.push_str(&fallback.into_string());
    out.push_str("\n</picture>\n");
    out
}

fn compose_picturefill(attrs: &AttributeSet, sources: &[ComposedSource]) -> String {
    let mut out = format!("<span {}>\n", attrs.render());
    for entry in sources.iter().rev() {
        let tag = html! { span data-src=(entry.url) data-media=[entry.media_attr()] {} };
        out.push_str(&tag.into_string());
        out.push('\n');
    }
    let fallback_url = sources
        .iter()
        .find(|s| s.is_default())
        .or(sources.first())
        .map(|s| s.url.as_str())
        .unwrap_or_default();
    let noscript = html! {
        img src=(fallback_url) alt=(attrs.value("data-alt").unwrap_or_default());
    };
    out.push_str("<noscript>\n");
    out.push_str(&noscript.into_string());
    out.push_str("\n</noscript>\n</span>\n");
    out
}
