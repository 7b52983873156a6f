//! The frame's commands: generate, repeat, browse history, clear.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context as _, bail};
use frame_compositor::{AssetLoader, Compositor, GridPosition};
use frame_db::{Database, ImageRecord, LogKind};
use generation_client::{GenerationClient, IMAGES_PER_PROMPT, demo_images, enrich_prompt};
use image::DynamicImage;
use serde::Serialize;

use crate::chooser::read_choice;
use crate::config::AppConfig;
use crate::display::DisplaySink;

/// Where new images come from.
pub enum ImageSource {
    Provider(GenerationClient),
    /// Reuse images already in the image directory.
    Demo,
}

impl ImageSource {
    pub fn from_config(config: &AppConfig) -> Self {
        if config.demo_mode {
            Self::Demo
        } else {
            Self::Provider(
                GenerationClient::new(config.api_key.clone())
                    .with_api_url(config.api_url.clone())
                    .with_model(config.model.clone()),
            )
        }
    }
}

/// JSON listing entry for `list`.
#[derive(Debug, Serialize)]
struct HistoryEntry<'a> {
    label: &'a str,
    #[serde(flatten)]
    record: &'a ImageRecord,
}

/// Everything a command needs.
pub struct FrameApp<L, S> {
    db: Database,
    config: AppConfig,
    compositor: Compositor<L>,
    sink: S,
    source: ImageSource,
}

impl<L: AssetLoader, S: DisplaySink> FrameApp<L, S> {
    pub fn new(db: Database, config: AppConfig, compositor: Compositor<L>, sink: S, source: ImageSource) -> Self {
        Self {
            db,
            config,
            compositor,
            sink,
            source,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Generate images for `prompt`, let the user pick one, display it.
    pub async fn new_prompt<R: BufRead, W: Write>(
        &mut self,
        prompt: &str,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<ImageRecord, anyhow::Error> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            bail!("prompt is empty");
        }

        let paths = match &self.source {
            ImageSource::Provider(client) => {
                let enriched = enrich_prompt(prompt, &[self.config.prompt_style.as_str()]);
                client.generate(&enriched, &self.config.image_dir).await?
            }
            ImageSource::Demo => demo_images(&self.config.image_dir)?,
        };
        if paths.is_empty() {
            bail!("no images were generated for \"{prompt}\"");
        }
        tracing::info!(count = paths.len(), "Images ready");

        let records: Vec<ImageRecord> = paths
            .into_iter()
            .map(|path| ImageRecord::new(path, prompt))
            .collect();
        self.db.append_images(LogKind::Generated, &records)?;
        self.choose_and_display(records, reader, writer)
    }

    /// Offer the most recently generated images again.
    pub fn repeat<R: BufRead, W: Write>(&mut self, reader: &mut R, writer: &mut W) -> Result<ImageRecord, anyhow::Error> {
        let records = self.recent(LogKind::Generated)?;
        self.choose_and_display(records, reader, writer)
    }

    /// Offer the most recently displayed images again.
    pub fn history<R: BufRead, W: Write>(&mut self, reader: &mut R, writer: &mut W) -> Result<ImageRecord, anyhow::Error> {
        let records = self.recent(LogKind::Chosen)?;
        self.choose_and_display(records, reader, writer)
    }

    pub fn clear(&mut self) -> Result<(), anyhow::Error> {
        self.sink.clear()
    }

    /// Empty both logs. Images on disk are kept.
    pub fn clear_history(&self) -> Result<usize, anyhow::Error> {
        let generated = self.db.clear_log(LogKind::Generated)?;
        let chosen = self.db.clear_log(LogKind::Chosen)?;
        Ok(generated + chosen)
    }

    /// Recent unique records of a log as pretty JSON, newest first.
    pub fn list(&self, kind: LogKind, limit: usize) -> Result<String, anyhow::Error> {
        let records = self.db.recent_unique_images(kind, limit)?;
        let entries: Vec<HistoryEntry<'_>> = records
            .iter()
            .zip(GridPosition::labels().into_iter().chain(std::iter::repeat("")))
            .map(|(record, label)| HistoryEntry { label, record })
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    /// Import a legacy `file_name,prompt` text log, resolving names in the image dir.
    pub fn import(&self, kind: LogKind, log_path: &Path) -> Result<usize, anyhow::Error> {
        let n = self
            .db
            .import_text_log(kind, log_path, &self.config.image_dir)
            .with_context(|| format!("import '{}'", log_path.display()))?;
        Ok(n)
    }

    fn recent(&self, kind: LogKind) -> Result<Vec<ImageRecord>, anyhow::Error> {
        let records = self.db.recent_unique_images(kind, IMAGES_PER_PROMPT)?;
        if records.is_empty() {
            bail!("no {} images in the history yet", kind.as_str());
        }
        Ok(records)
    }

    fn choose_and_display<R: BufRead, W: Write>(
        &mut self,
        mut records: Vec<ImageRecord>,
        reader: &mut R,
        writer: &mut W,
    ) -> Result<ImageRecord, anyhow::Error> {
        records.truncate(GridPosition::ALL.len());
        let images = records
            .iter()
            .map(|r| open_image(&r.image_path))
            .collect::<Result<Vec<_>, _>>()?;
        let all_labels = GridPosition::labels();
        let labels = &all_labels[..images.len()];
        let output = self.config.output_dimensions()?;

        let collage = self
            .compositor
            .build_collage(&images, labels, output, self.config.grid_padding)?;
        self.sink.show(&collage)?;

        let index = read_choice(reader, writer, labels)?;
        let chosen = records.swap_remove(index);
        tracing::info!(label = labels[index], path = %chosen.image_path.display(), "Displaying chosen image");

        let display = self
            .compositor
            .build_display_image(&images[index], &chosen.prompt, output)?;
        self.sink.show(&display)?;
        self.db.append_images(LogKind::Chosen, std::slice::from_ref(&chosen))?;
        Ok(chosen)
    }
}

fn open_image(path: &Path) -> Result<DynamicImage, anyhow::Error> {
    image::open(path).with_context(|| format!("open image '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_compositor::GeneratedAssets;
    use frame_compositor::assets::{load_first_font, system_font_candidates};
    use image::{Rgb, RgbImage};
    use std::io::Cursor;

    /// Keeps every shown image in memory.
    #[derive(Default)]
    struct MemorySink {
        shown: Vec<DynamicImage>,
        cleared: usize,
        /// Refuse to show more than this many images.
        fail_after: Option<usize>,
    }

    impl DisplaySink for MemorySink {
        fn show(&mut self, image: &DynamicImage) -> Result<(), anyhow::Error> {
            if self.fail_after.is_some_and(|n| self.shown.len() >= n) {
                anyhow::bail!("panel refresh failed");
            }
            self.shown.push(image.clone());
            Ok(())
        }

        fn clear(&mut self) -> Result<(), anyhow::Error> {
            self.cleared += 1;
            Ok(())
        }
    }

    const COLORS: [[u8; 3]; 4] = [[220, 30, 30], [30, 200, 30], [30, 30, 220], [220, 220, 30]];

    /// A demo-mode app over a temp dir holding four solid-colour images.
    fn demo_app(dir: &Path) -> FrameApp<GeneratedAssets, MemorySink> {
        let font = load_first_font(system_font_candidates())
            .expect("command tests need a system font (install DejaVu Sans or Liberation Sans)");
        let mut config = AppConfig::with_data_dir(dir);
        config.demo_mode = true;
        std::fs::create_dir_all(&config.image_dir).unwrap();
        for (i, color) in COLORS.iter().enumerate() {
            RgbImage::from_pixel(64, 64, Rgb(*color))
                .save(config.image_dir.join(format!("generation-{i}.png")))
                .unwrap();
        }
        let db = Database::open_in_memory().unwrap();
        let compositor = Compositor::new(GeneratedAssets, font);
        FrameApp::new(db, config, compositor, MemorySink::default(), ImageSource::Demo)
    }

    fn input(s: &str) -> Cursor<Vec<u8>> {
        Cursor::new(s.as_bytes().to_vec())
    }

    fn pixel(img: &DynamicImage, x: u32, y: u32) -> [u8; 3] {
        img.to_rgb8().get_pixel(x, y).0
    }

    fn close_to(actual: [u8; 3], expected: [u8; 3]) -> bool {
        actual.iter().zip(expected).all(|(a, e)| a.abs_diff(e) <= 8)
    }

    #[tokio::test]
    async fn test_new_prompt_shows_collage_then_choice() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = demo_app(dir.path());
        let mut out = Vec::new();

        let chosen = app
            .new_prompt("a red barn", &mut input("c\n"), &mut out)
            .await
            .unwrap();
        assert!(chosen.image_path.ends_with("generation-2.png"));
        assert_eq!(chosen.prompt, "a red barn");

        let shown = &app.sink().shown;
        assert_eq!(shown.len(), 2);
        assert!(shown.iter().all(|img| img.width() == 448 && img.height() == 600));
        // chosen picture fills the top square of the display image
        assert!(close_to(pixel(&shown[1], 224, 224), COLORS[2]));

        assert_eq!(app.db().count_images(LogKind::Generated).unwrap(), 4);
        let chosen_log = app.db().recent_unique_images(LogKind::Chosen, 4).unwrap();
        assert_eq!(chosen_log, vec![chosen]);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = demo_app(dir.path());
        let err = app
            .new_prompt("   ", &mut input("a\n"), &mut Vec::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert!(app.sink().shown.is_empty());
    }

    #[test]
    fn test_repeat_and_history_need_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = demo_app(dir.path());
        assert!(app.repeat(&mut input("a\n"), &mut Vec::new()).is_err());
        assert!(app.history(&mut input("a\n"), &mut Vec::new()).is_err());
        assert!(app.sink().shown.is_empty());
    }

    #[test]
    fn test_history_offers_previous_choices_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = demo_app(dir.path());
        let image_dir = app.config.image_dir.clone();
        let older = ImageRecord::new(image_dir.join("generation-0.png"), "first");
        let newer = ImageRecord::new(image_dir.join("generation-3.png"), "second");
        app.db()
            .append_images(LogKind::Chosen, &[older.clone(), newer.clone()])
            .unwrap();

        let chosen = app.history(&mut input("b\n"), &mut Vec::new()).unwrap();
        assert_eq!(chosen, older);

        // the collage has two populated cells; the bottom half stays black
        let collage = &app.sink().shown[0];
        assert!(close_to(pixel(collage, 112, 112), COLORS[3]));
        assert!(close_to(pixel(collage, 336, 112), COLORS[0]));
        assert_eq!(pixel(collage, 224, 450), [0, 0, 0]);
    }

    #[test]
    fn test_repeat_uses_generated_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = demo_app(dir.path());
        let image_dir = app.config.image_dir.clone();
        let records: Vec<ImageRecord> = (0..4)
            .map(|i| ImageRecord::new(image_dir.join(format!("generation-{i}.png")), "p"))
            .collect();
        app.db().append_images(LogKind::Generated, &records).unwrap();

        let chosen = app.repeat(&mut input("A\n"), &mut Vec::new()).unwrap();
        assert_eq!(chosen, records[3]);
        assert_eq!(app.db().count_images(LogKind::Chosen).unwrap(), 1);
    }

    #[test]
    fn test_failed_display_is_not_logged_as_chosen() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = demo_app(dir.path());
        app.sink.fail_after = Some(1);
        let image_dir = app.config.image_dir.clone();
        app.db()
            .append_images(LogKind::Generated, &[ImageRecord::new(image_dir.join("generation-0.png"), "p")])
            .unwrap();

        let err = app.repeat(&mut input("a\n"), &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("panel refresh failed"));
        assert_eq!(app.sink().shown.len(), 1);
        assert_eq!(app.db().count_images(LogKind::Chosen).unwrap(), 0);
    }

    #[test]
    fn test_missing_image_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = demo_app(dir.path());
        app.db()
            .append_images(LogKind::Generated, &[ImageRecord::new("/nonexistent/gone.png", "p")])
            .unwrap();
        let err = app.repeat(&mut input("a\n"), &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("gone.png"));
    }

    #[test]
    fn test_clear_and_clear_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = demo_app(dir.path());
        app.db()
            .append_images(LogKind::Generated, &[ImageRecord::new("a.png", "p")])
            .unwrap();
        app.db()
            .append_images(LogKind::Chosen, &[ImageRecord::new("a.png", "p")])
            .unwrap();

        app.clear().unwrap();
        assert_eq!(app.sink().cleared, 1);
        assert_eq!(app.clear_history().unwrap(), 2);
        assert_eq!(app.db().count_images(LogKind::Generated).unwrap(), 0);
    }

    #[test]
    fn test_list_and_import() {
        let dir = tempfile::tempdir().unwrap();
        let app = demo_app(dir.path());
        let log = dir.path().join("chosen.log");
        std::fs::write(&log, "generation-1.png,a fox\ngeneration-2.png,a boat\n").unwrap();

        assert_eq!(app.import(LogKind::Chosen, &log).unwrap(), 2);
        let json: serde_json::Value = serde_json::from_str(&app.list(LogKind::Chosen, 4).unwrap()).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["label"], "A");
        assert_eq!(entries[0]["prompt"], "a boat");
        assert!(entries[1]["image_path"].as_str().unwrap().ends_with("generation-1.png"));
    }
}
