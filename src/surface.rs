// src/surface.rs

use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::render::{escape_html, NO_DATA_HTML};

/// The page regions the pipeline writes to, by their stable element ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceId {
    Ticker,
    Message,
    Float,
    Offerings,
    Wick,
    Gap,
}

impl SurfaceId {
    pub const ALL: [SurfaceId; 6] = [
        SurfaceId::Ticker,
        SurfaceId::Message,
        SurfaceId::Float,
        SurfaceId::Offerings,
        SurfaceId::Wick,
        SurfaceId::Gap,
    ];

    pub fn element_id(&self) -> &'static str {
        match self {
            SurfaceId::Ticker => "ticker",
            SurfaceId::Message => "result-message",
            SurfaceId::Float => "tbl-float",
            SurfaceId::Offerings => "tbl-offerings",
            SurfaceId::Wick => "tbl-wick",
            SurfaceId::Gap => "tbl-gap",
        }
    }

    pub fn is_table(&self) -> bool {
        !matches!(self, SurfaceId::Ticker | SurfaceId::Message)
    }
}

/// Content for one surface: plain text (escaped on output) or table markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Html(String),
}

impl Fragment {
    pub fn to_html(&self) -> String {
        match self {
            Fragment::Text(text) => escape_html(text),
            Fragment::Html(html) => html.clone(),
        }
    }
}

/// Where rendered output goes. A batch passed to `replace_all` is applied as
/// a whole; every surface in it is overwritten.
pub trait RenderTarget: Send {
    fn replace_all(&mut self, updates: Vec<(SurfaceId, Fragment)>) -> io::Result<()>;

    fn replace(&mut self, surface: SurfaceId, fragment: Fragment) -> io::Result<()> {
        self.replace_all(vec![(surface, fragment)])
    }
}

/// Keeps the latest fragment per surface in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryBoard {
    surfaces: BTreeMap<SurfaceId, Fragment>,
    commits: usize,
}

impl MemoryBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, surface: SurfaceId) -> Option<&Fragment> {
        self.surfaces.get(&surface)
    }

    /// Number of batches applied so far.
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl RenderTarget for MemoryBoard {
    fn replace_all(&mut self, updates: Vec<(SurfaceId, Fragment)>) -> io::Result<()> {
        self.surfaces.extend(updates);
        self.commits += 1;
        Ok(())
    }
}

/// Writes each surface to `<dir>/<element-id>.html` and keeps `<dir>/index.html`
/// assembled from the current fragments.
pub struct HtmlDirectory {
    dir: PathBuf,
    current: BTreeMap<SurfaceId, Fragment>,
}

pub const INDEX_FILE: &str = "index.html";

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

impl HtmlDirectory {
    /// Open `dir`, creating it if needed, and load any fragments already there.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating output directory {:?}", &dir))?;

        let mut current = BTreeMap::new();
        for surface in SurfaceId::ALL {
            let path = dir.join(format!("{}.html", surface.element_id()));
            if !path.is_file() {
                continue;
            }
            let html = fs::read_to_string(&path)
                .with_context(|| format!("reading surface {:?}", &path))?;
            current.insert(surface, Fragment::Html(html));
        }

        Ok(Self { dir, current })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn fragment_path(&self, surface: SurfaceId) -> PathBuf {
        self.dir.join(format!("{}.html", surface.element_id()))
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    fn page(&self) -> String {
        let html = |surface: SurfaceId| {
            self.current
                .get(&surface)
                .map(Fragment::to_html)
                .unwrap_or_else(|| {
                    if surface.is_table() {
                        NO_DATA_HTML.to_string()
                    } else {
                        String::new()
                    }
                })
        };

        let mut out = String::from(
            "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Ticker Dashboard</title>\n</head>\n<body>\n",
        );
        out.push_str(&format!(
            "<h1>Ticker: <span id=\"{}\">{}</span></h1>\n",
            SurfaceId::Ticker.element_id(),
            html(SurfaceId::Ticker)
        ));
        out.push_str(&format!(
            "<p id=\"{}\">{}</p>\n",
            SurfaceId::Message.element_id(),
            html(SurfaceId::Message)
        ));
        for (surface, title) in [
            (SurfaceId::Float, "Float"),
            (SurfaceId::Offerings, "Offerings"),
            (SurfaceId::Wick, "Wick Days"),
            (SurfaceId::Gap, "Gap Days"),
        ] {
            out.push_str(&format!(
                "<section>\n<h2>{}</h2>\n<table id=\"{}\" class=\"table\">{}</table>\n</section>\n",
                title,
                surface.element_id(),
                html(surface)
            ));
        }
        out.push_str("</body>\n</html>\n");
        out
    }
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        if let Err(e) = fs::remove_file(tmp) {
            warn!(path = %tmp.display(), error = %e, "could not remove staged fragment");
        }
    }
}

impl RenderTarget for HtmlDirectory {
    fn replace_all(&mut self, updates: Vec<(SurfaceId, Fragment)>) -> io::Result<()> {
        // stage every fragment before any of them replaces the old file
        let mut staged = Vec::with_capacity(updates.len());
        for (surface, fragment) in &updates {
            let path = self.fragment_path(*surface);
            let tmp = tmp_path(&path);
            if let Err(e) = fs::write(&tmp, fragment.to_html()) {
                // a half-written tmp may exist too
                let _ = fs::remove_file(&tmp);
                discard(&staged);
                return Err(e);
            }
            staged.push((tmp, path));
        }

        let mut updates = updates.into_iter();
        for (i, (tmp, path)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(tmp, path) {
                discard(&staged[i..]);
                // keep the page in step with the fragments that did land
                self.current.extend(updates.by_ref().take(i));
                if let Err(page_err) = write_atomic(&self.index_path(), &self.page()) {
                    warn!(error = %page_err, "could not rewrite index after failed commit");
                }
                return Err(e);
            }
        }

        self.current.extend(updates);
        write_atomic(&self.index_path(), &self.page())?;
        debug!(dir = %self.dir.display(), "surfaces written");
        Ok(())
    }
}
