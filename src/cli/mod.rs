//! # Command-Line Front End
//!
//! One subcommand per reader action. Each command builds what it needs from
//! the resolved config, runs once, and prints plain text.

mod render;

use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Subcommand;
use log::{info, warn};

use noor::core::{RequestScope, ResolvedConfig};
use noor::flows::{
    FlowRequest, FlowResponse, PromptExecutor, RecitationInput, RemedyInput, SummarizeInput,
    TafsirInput, VerseMessageInput,
};
use noor::inference::{CompletionProvider, LmStudioProvider, OpenRouterProvider, ProviderError};
use noor::quran::audio::active_word;
use noor::quran::data::{self, RECITERS, SURAHS, THEMES, TRANSLATIONS};
use noor::quran::{Ayah, QuranClient, Surah, VerseKey, VerseResolver};
use noor::store::{BookmarkStore, DialogFlag, FileStore, SessionFlags, SettingKey, Settings, SettingsStore};

pub type CliResult = Result<(), Box<dyn Error>>;

/// Bookmarks after which the support notice is shown once.
const SUPPORT_NOTICE_AFTER: usize = 5;

#[derive(Subcommand)]
pub enum Command {
    /// List all 114 surahs
    Surahs,
    /// Show details for one surah
    Surah { id: u16 },
    /// Show where a Juz starts and ends
    Juz { number: u8 },
    /// Read a surah with its translation
    Read {
        id: u16,
        /// Translation id (defaults to the saved setting)
        #[arg(short, long)]
        translation: Option<u16>,
    },
    /// Search verses (Arabic queries are matched locally)
    Search { query: Vec<String> },
    /// Chapter audio and word timings
    Audio {
        id: u16,
        /// Reciter id (defaults to the saved setting)
        #[arg(short, long)]
        reciter: Option<u16>,
        /// Show the word being recited at this offset, in milliseconds
        #[arg(long)]
        at: Option<u64>,
    },
    /// List available reciters
    Reciters,
    /// List available translations
    Translations,
    /// List reader themes
    Themes,
    /// Show or change reader settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Manage bookmarked verses
    Bookmarks {
        #[command(subcommand)]
        action: Option<BookmarkAction>,
    },
    /// AI summary of a surah
    Summarize { id: u16 },
    /// AI tafsir (in Arabic) of a verse, e.g. `2:255`
    Tafsir { key: String },
    /// A short AI reflection on a verse
    Message { key: String },
    /// Verses, a reflection and a supplication for how you feel
    Remedy { feeling: Vec<String> },
    /// AI feedback on a recording of a verse
    Recite {
        key: String,
        /// Audio file (wav or mp3)
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    Show,
    /// Set one field, e.g. `font_size 32`
    Set { key: String, value: String },
    Reset,
}

#[derive(Subcommand)]
pub enum BookmarkAction {
    /// List bookmarked keys
    List,
    Add { key: String },
    Remove { key: String },
    Clear,
    /// Print every bookmarked verse with its translation
    Show,
}

/// Everything a command may need, wired from config.
pub struct App {
    config: ResolvedConfig,
    client: Arc<QuranClient>,
    resolver: VerseResolver,
    settings: SettingsStore,
    bookmarks: BookmarkStore,
    flags: SessionFlags,
    width: usize,
}

impl App {
    pub fn new(config: ResolvedConfig, width: usize) -> io::Result<Self> {
        let store = Arc::new(FileStore::open(&config.data_dir)?);
        let client = Arc::new(QuranClient::new(Some(config.quran_base_url.clone())));
        Ok(Self {
            resolver: VerseResolver::new(client.clone()),
            client,
            settings: SettingsStore::new(store.clone()),
            bookmarks: BookmarkStore::new(store.clone()),
            flags: SessionFlags::new(store),
            config,
            width,
        })
    }

    pub async fn run(&self, command: Command) -> CliResult {
        self.welcome();
        match command {
            Command::Surahs => self.surahs(),
            Command::Surah { id } => self.surah(id),
            Command::Juz { number } => self.juz(number),
            Command::Read { id, translation } => self.read(id, translation).await,
            Command::Search { query } => self.search(&query.join(" ")).await,
            Command::Audio { id, reciter, at } => self.audio(id, reciter, at).await,
            Command::Reciters => {
                for r in RECITERS {
                    match r.style {
                        Some(style) => println!("{:>3}  {} ({})", r.id, r.name, style),
                        None => println!("{:>3}  {}", r.id, r.name),
                    }
                }
                Ok(())
            }
            Command::Translations => {
                for t in TRANSLATIONS {
                    println!("{:>4}  {:<36} {:<12} {}", t.id, t.name, t.language, t.author);
                }
                Ok(())
            }
            Command::Themes => {
                for t in THEMES {
                    println!("{:<8} {}", t.id, t.name);
                }
                Ok(())
            }
            Command::Settings { action } => self.settings_cmd(action.unwrap_or(SettingsAction::Show)),
            Command::Bookmarks { action } => self.bookmarks_cmd(action.unwrap_or(BookmarkAction::List)).await,
            Command::Summarize { id } => self.summarize(id).await,
            Command::Tafsir { key } => self.tafsir(&key).await,
            Command::Message { key } => self.message(&key).await,
            Command::Remedy { feeling } => {
                let request = FlowRequest::SpiritualRemedy(RemedyInput {
                    feeling: feeling.join(" "),
                });
                self.run_flow(request).await
            }
            Command::Recite { key, file } => self.recite(&key, &file).await,
        }
    }

    fn welcome(&self) {
        match self.flags.first_time(DialogFlag::Welcome) {
            Ok(true) => {
                eprintln!("Welcome to noor. Run `noor surahs` to begin, or `noor --help` for every command.\n")
            }
            Ok(false) => {}
            Err(e) => warn!("Could not read dialog flags: {}", e),
        }
    }

    // ── Reference data ──────────────────────────────────────────────────

    fn surahs(&self) -> CliResult {
        for s in SURAHS {
            println!(
                "{:>3}  {:<18} {:<24} {:<8} {:>3} verses",
                s.id,
                s.name,
                s.meaning,
                s.revelation.label(),
                s.verse_count
            );
        }
        Ok(())
    }

    fn surah(&self, id: u16) -> CliResult {
        let s = find_surah(id)?;
        println!("{}. {} ({})", s.id, s.name, s.meaning);
        println!("{}", render::right_align(s.arabic_name, self.width).join("\n"));
        println!("Revealed in {}, {} verses", s.revelation.label(), s.verse_count);
        let juz: Vec<String> = data::juz_of(s).iter().map(|j| j.to_string()).collect();
        println!("Juz: {}", juz.join(", "));
        Ok(())
    }

    fn juz(&self, number: u8) -> CliResult {
        let info = data::juz(number).ok_or_else(|| format!("Juz must be between 1 and 30, got {number}"))?;
        println!("Juz {}: {} to {}", info.number, info.start, info.end);
        for id in info.surahs {
            if let Some(s) = data::find_surah(id) {
                println!("  {:>3}  {}", s.id, s.name);
            }
        }
        Ok(())
    }

    // ── Reading ─────────────────────────────────────────────────────────

    async fn read(&self, id: u16, translation: Option<u16>) -> CliResult {
        let surah = find_surah(id)?;
        let settings = self.settings.get()?;
        let translation = translation.unwrap_or(settings.translation);
        let wanted = settings.show_translation.then_some(translation);

        let scope = RequestScope::new();
        loop {
            let view = tokio::select! {
                view = scope.run(self.resolver.resolve_chapter(id, wanted)) => view,
                _ = tokio::signal::ctrl_c() => {
                    scope.invalidate();
                    None
                }
            };
            let Some(view) = view else {
                eprintln!("Cancelled.");
                return Ok(());
            };

            if !view.verses.is_empty() {
                println!("{}. {}  {}\n", surah.id, surah.name, surah.arabic_name);
                for ayah in &view.verses {
                    println!("{}\n", render::verse(ayah, self.width, settings.show_translation));
                }
            }
            match view.error {
                None => return Ok(()),
                Some(error) => {
                    eprintln!("{error}");
                    if !prompt_retry()? {
                        return Err(error.into());
                    }
                    info!("Retrying surah {}", id);
                }
            }
        }
    }

    async fn search(&self, query: &str) -> CliResult {
        let hits = self.resolver.search(query).await?;
        if hits.is_empty() {
            println!("No results for {query:?}");
            return Ok(());
        }
        for hit in hits {
            println!("{}", hit.verse_key);
            println!("{}", render::right_align(&hit.text, self.width).join("\n"));
            if let Some(t) = hit.translation {
                println!("{}", textwrap::fill(&t, self.width));
            }
            println!();
        }
        Ok(())
    }

    async fn audio(&self, id: u16, reciter: Option<u16>, at: Option<u64>) -> CliResult {
        let surah = find_surah(id)?;
        let reciter_id = match reciter {
            Some(r) => r,
            None => self.settings.get()?.reciter,
        };
        let reciter = data::find_reciter(reciter_id).ok_or_else(|| format!("Unknown reciter {reciter_id}"))?;
        let audio = self.client.chapter_audio(reciter.id, surah.id).await?;

        println!("{} recited by {}", surah.name, reciter.name);
        println!("{}", audio.audio_url);
        if let Some(format) = &audio.format {
            println!("Format: {format}");
        }
        println!("{} verse timings", audio.timings.len());
        if let Some(position) = at {
            match active_word(&audio.timings, position) {
                Some(cursor) => println!("At {}ms: verse {}, word {}", position, cursor.verse_key, cursor.position),
                None => println!("At {position}ms: no word is being recited"),
            }
        }
        Ok(())
    }

    // ── Settings & bookmarks ────────────────────────────────────────────

    fn settings_cmd(&self, action: SettingsAction) -> CliResult {
        let settings = match action {
            SettingsAction::Show => self.settings.get()?,
            SettingsAction::Set { key, value } => self.settings.set(key.parse::<SettingKey>()?, &value)?,
            SettingsAction::Reset => {
                self.settings.reset()?;
                Settings::default()
            }
        };
        let value = serde_json::to_value(&settings)?;
        for key in SettingKey::ALL {
            println!("{:<18} {}", key.name(), value[key.name()]);
        }
        Ok(())
    }

    async fn bookmarks_cmd(&self, action: BookmarkAction) -> CliResult {
        match action {
            BookmarkAction::List => {
                let entries = self.bookmarks.entries()?;
                if entries.is_empty() {
                    println!("No bookmarks yet.");
                }
                for b in entries {
                    println!("{:<8} added {}", b.key.to_string(), b.added_at.format("%Y-%m-%d %H:%M"));
                }
            }
            BookmarkAction::Add { key } => {
                if self.bookmarks.add_str(&key)? {
                    println!("Bookmarked {key}");
                    self.maybe_support_notice()?;
                } else {
                    println!("{key} is already bookmarked");
                }
            }
            BookmarkAction::Remove { key } => {
                let key = parse_key(&key)?;
                if self.bookmarks.remove(&key)? {
                    println!("Removed {key}");
                } else {
                    println!("{key} was not bookmarked");
                }
            }
            BookmarkAction::Clear => {
                self.bookmarks.clear()?;
                println!("All bookmarks removed");
            }
            BookmarkAction::Show => {
                let settings = self.settings.get()?;
                let translation = settings.show_translation.then_some(settings.translation);
                let verses = self.bookmarks.resolve(&self.resolver, translation).await?;
                for ayah in verses {
                    println!("{}\n", render::verse(&ayah, self.width, settings.show_translation));
                }
            }
        }
        Ok(())
    }

    fn maybe_support_notice(&self) -> CliResult {
        if self.bookmarks.list()?.len() >= SUPPORT_NOTICE_AFTER && self.flags.first_time(DialogFlag::Support)? {
            eprintln!("\nEnjoying noor? Share it with someone who might benefit.");
        }
        Ok(())
    }

    // ── AI flows ────────────────────────────────────────────────────────

    fn executor(&self) -> Result<PromptExecutor, ProviderError> {
        Ok(PromptExecutor::new(
            build_provider(&self.config)?,
            self.config.model_name.clone(),
        ))
    }

    async fn run_flow(&self, request: FlowRequest) -> CliResult {
        let executor = self.executor()?;
        match executor.execute(&request).await {
            Ok(response) => {
                self.print_response(response);
                Ok(())
            }
            Err(e) => {
                warn!("{} failed: {}", request.name(), e);
                Err(e.user_message().into())
            }
        }
    }

    fn print_response(&self, response: FlowResponse) {
        let w = self.width;
        match response {
            FlowResponse::Summarize(s) => println!("{}", render::markdown(&s.summary, w)),
            FlowResponse::Tafsir(t) => println!("{}", render::right_align(&t.tafsir, w).join("\n")),
            FlowResponse::VerseMessage(m) => println!("{}", render::markdown(&m.message, w)),
            FlowResponse::SpiritualRemedy(r) => {
                for c in &r.citations {
                    println!("{} ({})", c.surah_name, c.reference);
                    println!("{}", render::right_align(&c.arabic_text, w).join("\n"));
                    println!("{}\n", textwrap::fill(&c.translation, w));
                }
                println!("{}\n", render::markdown(&r.interpretation, w));
                println!("Supplication:\n{}\n", render::markdown(&r.supplication, w));
                println!(
                    "Listen: {} recited by {} (noor audio {} --reciter {})",
                    r.suggestion.surah.name, r.suggestion.reciter.name, r.suggestion.surah.id, r.suggestion.reciter.id
                );
            }
            FlowResponse::RecitationAnalysis(a) => {
                println!("Score: {}/100\n", a.score);
                println!("{}\n", render::markdown(&a.feedback, w));
                for word in &a.words {
                    let mark = if word.correct { "✓" } else { "✗" };
                    match &word.note {
                        Some(note) => println!("  {mark} {}  {}", word.word, note),
                        None => println!("  {mark} {}", word.word),
                    }
                }
            }
        }
    }

    async fn verse(&self, key: &VerseKey, translation: Option<u16>) -> Result<Ayah, Box<dyn Error>> {
        let mut verses = self.resolver.resolve_keys(&[*key], translation).await?;
        verses.pop().ok_or_else(|| format!("Verse {key} not found").into())
    }

    async fn summarize(&self, id: u16) -> CliResult {
        let surah = find_surah(id)?;
        let verses = self.resolver.resolve_verses(id).await?;
        let verses_text = verses.iter().map(|v| v.text.as_str()).collect::<Vec<_>>().join(" ");
        self.run_flow(FlowRequest::Summarize(SummarizeInput {
            surah_name: surah.name.to_string(),
            verses_text,
        }))
        .await
    }

    async fn tafsir(&self, key: &str) -> CliResult {
        let key = parse_key(key)?;
        let surah = find_surah(key.surah)?;
        let translation = self.settings.get()?.translation;
        let ayah = self.verse(&key, Some(translation)).await?;
        self.run_flow(FlowRequest::Tafsir(TafsirInput {
            surah_name: surah.name.to_string(),
            verse_number: key.verse,
            arabic_text: ayah.text,
            translation: ayah.translation.unwrap_or_default(),
        }))
        .await
    }

    async fn message(&self, key: &str) -> CliResult {
        let key = parse_key(key)?;
        let surah = find_surah(key.surah)?;
        let ayah = self.verse(&key, None).await?;
        self.run_flow(FlowRequest::VerseMessage(VerseMessageInput {
            surah_name: surah.name.to_string(),
            verse_number: key.verse,
            arabic_text: ayah.text,
        }))
        .await
    }

    async fn recite(&self, key: &str, file: &Path) -> CliResult {
        let key = parse_key(key)?;
        let ayah = self.verse(&key, None).await?;
        let audio = tokio::fs::read(file).await?;
        let audio_format = file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("wav")
            .to_ascii_lowercase();
        self.run_flow(FlowRequest::RecitationAnalysis(RecitationInput {
            original_text: ayah.text,
            audio,
            audio_format,
        }))
        .await
    }
}

/// Creates the configured completion provider.
pub fn build_provider(config: &ResolvedConfig) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
    match config.provider.as_str() {
        "openrouter" => {
            let key = config.openrouter_api_key.clone().ok_or_else(|| {
                ProviderError::Config(
                    "OpenRouter needs an API key. Set OPENROUTER_API_KEY or [openrouter] api_key".to_string(),
                )
            })?;
            Ok(Arc::new(OpenRouterProvider::new(key, Some(config.openrouter_base_url.clone()))?))
        }
        "lmstudio" => Ok(Arc::new(LmStudioProvider::new(Some(config.lmstudio_base_url.clone())))),
        other => Err(ProviderError::Config(format!(
            "Unknown provider {other:?}, expected \"openrouter\" or \"lmstudio\""
        ))),
    }
}

fn find_surah(id: u16) -> Result<&'static Surah, String> {
    data::find_surah(id).ok_or_else(|| format!("Surah must be between 1 and 114, got {id}"))
}

fn parse_key(raw: &str) -> Result<VerseKey, Box<dyn Error>> {
    Ok(raw.parse::<VerseKey>()?)
}

/// Asks whether to retry after a failed load. Non-interactive runs never retry.
fn prompt_retry() -> io::Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }
    eprint!("Retry? [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use noor::core::NoorConfig;
    use noor::core::config::resolve_with;

    fn config(provider: &str) -> ResolvedConfig {
        resolve_with(&NoorConfig::default(), Some(provider), |_| None)
    }

    #[test]
    fn openrouter_requires_key() {
        let result = build_provider(&config("openrouter"));
        assert!(matches!(result, Err(ProviderError::Config(_))));

        let mut with_key = config("openrouter");
        with_key.openrouter_api_key = Some("sk-test".to_string());
        assert_eq!(build_provider(&with_key).map(|p| p.name().to_string()).ok().as_deref(), Some("openrouter"));
    }

    #[test]
    fn lmstudio_needs_no_key() {
        let provider = build_provider(&config("lmstudio")).ok();
        assert_eq!(provider.map(|p| p.name().to_string()).as_deref(), Some("lmstudio"));
    }

    #[test]
    fn unknown_provider_is_config_error() {
        assert!(matches!(build_provider(&config("ollama")), Err(ProviderError::Config(_))));
    }

    #[test]
    fn parse_key_rejects_out_of_range() {
        assert!(parse_key("2:255").is_ok());
        assert!(parse_key("2:287").is_err());
        assert!(find_surah(0).is_err());
    }
}
