use crate::desktop::{ScriptSetter, WallpaperSetter};
use crate::notify::Notifier;
use crate::state::StateFile;
use crate::{
    ApodClient, Config, DateCode, DisplayOption, Error, ImageStore, Loader, Paths, Result, State,
};
use rand::seq::IndexedRandom;

/// Days `seed` looks back for a first picture.
const SEED_DAYS: u32 = 7;

pub struct Frontend {
    today: DateCode,
    client: ApodClient,
    store: ImageStore,
    state_file: StateFile,
    setter: Box<dyn WallpaperSetter>,
    notifier: Box<dyn Notifier>,
}

impl Frontend {
    pub fn new(paths: &Paths, config: &Config, today: DateCode, notifier: Box<dyn Notifier>) -> Self {
        Self {
            today,
            client: ApodClient::new(),
            store: ImageStore::new(&config.wallpaper_dir),
            state_file: StateFile::new(paths.state_file()),
            setter: Box::new(ScriptSetter::new(config.set_script_path(paths))),
            notifier,
        }
    }

    pub fn with_client(mut self, client: ApodClient) -> Self {
        self.client = client;
        self
    }

    pub fn with_setter(mut self, setter: impl WallpaperSetter + 'static) -> Self {
        self.setter = Box::new(setter);
        self
    }

    pub fn today(&self) -> DateCode {
        self.today
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub fn loader(&self) -> Loader<'_> {
        Loader::new(&self.client, &self.store, self.notifier.as_ref())
    }

    pub fn notify(&self, message: &str) {
        self.notifier.notify(message);
    }

    /// The wallpaper now showing, `(today, fit)` before the first one was set.
    pub fn state(&self) -> Result<State> {
        self.state_file.read(self.today)
    }

    /// Hands the picture of `state.date` to the set-script and records it as
    /// now showing. The record is only written when the script succeeded.
    pub fn set_wallpaper(&self, state: State) -> Result<()> {
        let wallpaper = self.store.path_for(state.date);
        self.setter.set_wallpaper(&wallpaper, state.option)?;
        self.state_file.write(&state)?;
        tracing::info!("Wallpaper set to {} ({})", state.date, state.option);
        Ok(())
    }

    /// Moves `n` pictures forward (or back for negative `n`) through the
    /// downloaded ones and shows that picture fitted.
    pub fn jump(&self, n: i64) -> Result<State> {
        let all = self.store.list_present()?;
        let current = self.state()?.date;
        let index = all
            .iter()
            .position(|d| *d == current)
            .ok_or(Error::NotFound(current))?;

        let target = match (index as i64).checked_add(n) {
            Some(target) if target >= 0 => target,
            Some(_) => return Err(Error::BeginReached),
            None if n > 0 => return Err(Error::EndReached),
            None => return Err(Error::BeginReached),
        };
        let Some(&date) = usize::try_from(target).ok().and_then(|i| all.get(i)) else {
            return Err(Error::EndReached);
        };

        let state = State::new(date, DisplayOption::Fit);
        self.set_wallpaper(state)?;
        Ok(state)
    }

    /// Shows the current picture again with fit and zoom swapped.
    pub fn toggle_view_mode(&self) -> Result<DisplayOption> {
        let mut state = self.state()?;
        state.option = state.option.toggled();
        self.set_wallpaper(state)?;
        Ok(state.option)
    }

    pub fn display_current(&self) -> Result<State> {
        let state = self.state()?;
        self.set_wallpaper(state)?;
        Ok(state)
    }

    /// Shows a random downloaded picture, keeping the display option. The
    /// newest picture is left out when there is a choice.
    pub fn random_archive(&self) -> Result<State> {
        let all = self.store.list_present()?;
        let candidates = match all.len() {
            0 => return Err(Error::NoBackgrounds),
            1 => &all[..],
            n => &all[..n - 1],
        };

        let mut rng = rand::rng();
        let &date = candidates.choose(&mut rng).ok_or(Error::NoBackgrounds)?;

        let mut state = self.state()?;
        state.date = date;
        self.set_wallpaper(state)?;
        Ok(state)
    }

    /// Gets a fresh setup going: fetches the most recent picture of the last
    /// week, then shows a random one.
    pub async fn seed(&self) -> Result<State> {
        let loader = self.loader();
        let mut date = self.today;

        for _ in 0..SEED_DAYS {
            match loader.download(date).await {
                Ok(outcome) if outcome.found() => break,
                Ok(_) => {}
                Err(e) => tracing::warn!("Could not download {date} while seeding: {e}"),
            }
            date = date.back();
        }

        self.random_archive()
    }

    /// Meant to run at session start. Shows today's picture when there is a
    /// new one, otherwise a random downloaded one.
    pub async fn run_at_login(&self) -> Result<()> {
        let today = self.today;

        if self.store.is_present(today)? {
            self.display_current()?;
            tracing::info!("Displayed the current wallpaper, as today was already downloaded");
            return Ok(());
        }

        let found = match self.loader().download(today).await {
            Ok(outcome) => outcome.found(),
            Err(e) => {
                tracing::error!("An error occurred during today's ({today}) image downloading: {e}");
                false
            }
        };

        if !found || !self.store.is_present(today)? {
            tracing::info!("No new image today ({today}) on APOD");
            self.notify("No new image today :-(");
            self.random_archive()?;
            tracing::info!("Displayed a random archive wallpaper, as today had no new image");
            return Ok(());
        }

        self.set_wallpaper(State::new(today, DisplayOption::Fit))?;
        self.notify(&format!("Wallpaper set to {today}"));
        Ok(())
    }

    pub async fn load_period(&self, days: u32) -> Result<()> {
        self.loader().load_period(self.today, days).await
    }

    pub fn page_url_on_background(&self) -> Result<String> {
        let state = self.state()?;
        Ok(self.client.page_url(state.date))
    }

    pub fn open_apod_today(&self) -> Result<()> {
        open_in_browser(&self.client.page_url(self.today))?;
        self.notify("Opened the default browser on APOD");
        Ok(())
    }

    pub fn open_apod_on_background(&self) -> Result<()> {
        open_in_browser(&self.page_url_on_background()?)?;
        self.notify("Browser opened on NASA apod-page belonging to this background");
        Ok(())
    }
}

fn open_in_browser(url: &str) -> Result<()> {
    tracing::debug!("Opening {url}");
    webbrowser::open(url)
        .map_err(|e| Error::DesktopEnv(format!("Could not open a browser on {url}: {e}")))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::desktop::script::tests::{FAIL, SUCCEED, write_script};
    use crate::notify::tests::Recorder;
    use crate::storage::tests::make_wallpapers;
    use mockito::Server;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        paths: Paths,
        calls: PathBuf,
        notes: Recorder,
        front: Frontend,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let paths = Paths::new(tmp.path().join("apod-bg"), tmp.path().join("autostart"));
            let config = Config::new(paths.default_wallpaper_dir());
            fs::create_dir_all(&config.wallpaper_dir).unwrap();
            config.save(&paths).unwrap();

            let calls = tmp.path().join("calls");
            write_script(
                &paths.set_script(),
                &format!(
                    "#!/bin/sh\necho \"$WALLPAPER $WALLPAPER_OPTIONS\" >> '{}'\n",
                    calls.display()
                ),
            );

            let notes = Recorder::default();
            let front = Frontend::new(&paths, &config, code("140121"), Box::new(notes.clone()));
            Self {
                _tmp: tmp,
                paths,
                calls,
                notes,
                front,
            }
        }

        fn wallpapers(self, codes: &[&str]) -> Self {
            make_wallpapers(self.front.store(), codes);
            self
        }

        fn showing(self, date: &str, option: DisplayOption) -> Self {
            StateFile::new(self.paths.state_file())
                .write(&State::new(code(date), option))
                .unwrap();
            self
        }

        fn script(self, body: &str) -> Self {
            write_script(&self.paths.set_script(), body);
            self
        }

        fn with_site(mut self, server: &Server) -> Self {
            self.front = self.front.with_client(ApodClient::with_base(&server.url()));
            self
        }

        /// Lines the set-script wrote, one per run.
        fn calls(&self) -> Vec<String> {
            fs::read_to_string(&self.calls)
                .map(|s| s.lines().map(str::to_string).collect())
                .unwrap_or_default()
        }

        fn call_for(&self, date: &str, option: &str) -> String {
            format!("{} {option}", self.front.store().path_for(code(date)).display())
        }

        fn raw_state(&self) -> Option<String> {
            fs::read_to_string(self.paths.state_file()).ok()
        }
    }

    fn code(s: &str) -> DateCode {
        s.parse().unwrap()
    }

    #[test]
    fn state_defaults_to_today_fit() {
        let f = Fixture::new();
        assert_eq!(f.front.state().unwrap(), State::new(code("140121"), DisplayOption::Fit));
    }

    #[test]
    fn jump_backward_moves_cursor_and_resets_to_fit() {
        let f = Fixture::new()
            .wallpapers(&["140120", "140121", "140122"])
            .showing("140121", DisplayOption::Zoom);

        let state = f.front.jump(-1).unwrap();

        assert_eq!(state, State::new(code("140120"), DisplayOption::Fit));
        assert_eq!(f.front.state().unwrap(), state);
        assert_eq!(f.calls(), [f.call_for("140120", "fit")]);
    }

    #[test]
    fn jump_forward_several() {
        let f = Fixture::new()
            .wallpapers(&["140120", "140121", "140122"])
            .showing("140120", DisplayOption::Fit);

        assert_eq!(f.front.jump(2).unwrap().date, code("140122"));
        assert_eq!(f.calls().len(), 1);
    }

    #[test]
    fn jump_past_the_end_changes_nothing() {
        let f = Fixture::new()
            .wallpapers(&["140120", "140121", "140122"])
            .showing("140122", DisplayOption::Zoom);
        let before = f.raw_state();

        let err = f.front.jump(1).unwrap_err();

        assert!(matches!(err, Error::EndReached));
        assert_eq!(err.to_string(), "End reached");
        assert_eq!(f.raw_state(), before);
        assert!(f.calls().is_empty());
    }

    #[test]
    fn jump_before_the_beginning_changes_nothing() {
        let f = Fixture::new()
            .wallpapers(&["140120"])
            .showing("140120", DisplayOption::Fit);
        let before = f.raw_state();

        let err = f.front.jump(-1).unwrap_err();

        assert_eq!(err.to_string(), "Begin reached");
        assert_eq!(f.raw_state(), before);
        assert!(f.calls().is_empty());
    }

    #[test]
    fn jump_from_a_purged_picture_fails() {
        let f = Fixture::new()
            .wallpapers(&["140120", "140122"])
            .showing("140121", DisplayOption::Fit);

        let err = f.front.jump(1).unwrap_err();

        assert_eq!(err.to_string(), "140121 was not found");
        assert!(f.calls().is_empty());
    }

    #[test]
    fn jump_by_extreme_offsets_reports_the_bounds() {
        let f = Fixture::new()
            .wallpapers(&["140120", "140121"])
            .showing("140121", DisplayOption::Fit);
        let before = f.raw_state();

        assert!(matches!(f.front.jump(i64::MAX), Err(Error::EndReached)));
        assert!(matches!(f.front.jump(i64::MIN), Err(Error::BeginReached)));
        assert_eq!(f.raw_state(), before);
        assert!(f.calls().is_empty());
    }

    #[test]
    fn malformed_state_fails_cursor_operations() {
        let f = Fixture::new().wallpapers(&["140120", "140121", "140122"]);
        fs::write(f.paths.state_file(), "140121").unwrap();

        assert!(matches!(f.front.jump(1), Err(Error::State(_))));
        assert!(matches!(f.front.toggle_view_mode(), Err(Error::State(_))));
        assert!(matches!(f.front.display_current(), Err(Error::State(_))));
        assert_eq!(f.raw_state().as_deref(), Some("140121"));
        assert!(f.calls().is_empty());
    }

    #[test]
    fn failing_script_leaves_state_untouched() {
        let f = Fixture::new()
            .wallpapers(&["140120", "140121"])
            .showing("140121", DisplayOption::Fit)
            .script(FAIL);
        let before = f.raw_state();

        let err = f
            .front
            .set_wallpaper(State::new(code("140120"), DisplayOption::Zoom))
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("exit status: 5"), "{message}");
        assert!(message.contains("Something went wrong"), "{message}");
        assert!(message.contains("Fault"), "{message}");
        assert_eq!(f.raw_state(), before);
    }

    #[test]
    fn failing_script_on_fresh_setup_writes_no_state() {
        let f = Fixture::new().wallpapers(&["140121"]).script(FAIL);
        assert!(f.front.display_current().is_err());
        assert_eq!(f.raw_state(), None);
    }

    #[test]
    fn toggle_view_mode_flips_and_applies() {
        let f = Fixture::new()
            .wallpapers(&["140120"])
            .showing("140120", DisplayOption::Fit);

        assert_eq!(f.front.toggle_view_mode().unwrap(), DisplayOption::Zoom);
        assert_eq!(f.front.toggle_view_mode().unwrap(), DisplayOption::Fit);
        assert_eq!(
            f.calls(),
            [f.call_for("140120", "zoom"), f.call_for("140120", "fit")]
        );
        assert_eq!(f.front.state().unwrap().date, code("140120"));
    }

    #[test]
    fn display_current_reapplies_state() {
        let f = Fixture::new()
            .wallpapers(&["140119"])
            .showing("140119", DisplayOption::Zoom);

        let state = f.front.display_current().unwrap();

        assert_eq!(state, State::new(code("140119"), DisplayOption::Zoom));
        assert_eq!(f.calls(), [f.call_for("140119", "zoom")]);
    }

    #[test]
    fn random_archive_skips_the_newest() {
        let f = Fixture::new()
            .wallpapers(&["140120", "140121"])
            .showing("140121", DisplayOption::Zoom);

        for _ in 0..5 {
            let state = f.front.random_archive().unwrap();
            assert_eq!(state, State::new(code("140120"), DisplayOption::Zoom));
        }
    }

    #[test]
    fn random_archive_with_single_picture() {
        let f = Fixture::new().wallpapers(&["140121"]);
        assert_eq!(f.front.random_archive().unwrap().date, code("140121"));
    }

    #[test]
    fn random_archive_needs_pictures() {
        let f = Fixture::new();
        assert!(matches!(f.front.random_archive(), Err(Error::NoBackgrounds)));
        assert!(f.calls().is_empty());
    }

    #[test]
    fn page_url_on_background_follows_state() {
        let f = Fixture::new().showing("131224", DisplayOption::Fit);
        assert_eq!(
            f.front.page_url_on_background().unwrap(),
            "https://apod.nasa.gov/apod/ap131224.html"
        );
    }

    #[tokio::test]
    async fn login_with_new_picture_shows_it() {
        let mut server = Server::new_async().await;
        let _page = server
            .mock("GET", "/apod/ap140121.html")
            .with_body(r#"<a href="image/1401/today.jpg"><IMG SRC="x"></a>"#)
            .create_async()
            .await;
        let _image = server
            .mock("GET", "/apod/image/1401/today.jpg")
            .with_body("jpeg")
            .create_async()
            .await;
        let f = Fixture::new()
            .wallpapers(&["140120"])
            .showing("140120", DisplayOption::Zoom)
            .with_site(&server);

        f.front.run_at_login().await.unwrap();

        assert_eq!(f.front.state().unwrap(), State::new(code("140121"), DisplayOption::Fit));
        assert_eq!(f.calls(), [f.call_for("140121", "fit")]);
        assert_eq!(
            f.notes.messages(),
            ["Downloading APOD-image for: 140121", "Wallpaper set to 140121"]
        );
    }

    #[tokio::test]
    async fn login_without_new_picture_shows_an_old_one() {
        let mut server = Server::new_async().await;
        let _page = server
            .mock("GET", "/apod/ap140121.html")
            .with_body(r#"<iframe src="https://www.youtube.com/embed/xyz"></iframe>"#)
            .create_async()
            .await;
        let f = Fixture::new()
            .wallpapers(&["140119", "140120"])
            .with_site(&server);

        f.front.run_at_login().await.unwrap();

        assert_eq!(f.front.state().unwrap().date, code("140119"));
        assert_eq!(f.notes.messages(), ["No new image today :-("]);
    }

    #[tokio::test]
    async fn login_when_offline_still_shows_an_old_one() {
        let mut server = Server::new_async().await;
        let _page = server
            .mock("GET", "/apod/ap140121.html")
            .with_status(502)
            .create_async()
            .await;
        let f = Fixture::new().wallpapers(&["140120"]).with_site(&server);

        f.front.run_at_login().await.unwrap();

        assert_eq!(f.front.state().unwrap().date, code("140120"));
    }

    #[tokio::test]
    async fn login_with_today_present_redisplays_without_network() {
        let mut server = Server::new_async().await;
        let page = server
            .mock("GET", "/apod/ap140121.html")
            .expect(0)
            .create_async()
            .await;
        let f = Fixture::new()
            .wallpapers(&["140120", "140121"])
            .showing("140120", DisplayOption::Zoom)
            .with_site(&server);

        f.front.run_at_login().await.unwrap();

        assert_eq!(f.calls(), [f.call_for("140120", "zoom")]);
        page.assert_async().await;
    }

    #[tokio::test]
    async fn seed_fetches_most_recent_picture_and_shows_it() {
        let mut server = Server::new_async().await;
        let _today = server
            .mock("GET", "/apod/ap140121.html")
            .with_body("<p>video today</p>")
            .create_async()
            .await;
        let _yesterday = server
            .mock("GET", "/apod/ap140120.html")
            .with_body(r#"<a href="image/1401/y.png">"#)
            .create_async()
            .await;
        let earlier = server
            .mock("GET", "/apod/ap140119.html")
            .expect(0)
            .create_async()
            .await;
        let _image = server
            .mock("GET", "/apod/image/1401/y.png")
            .with_body("png")
            .create_async()
            .await;
        let f = Fixture::new().with_site(&server);

        let state = f.front.seed().await.unwrap();

        assert_eq!(state, State::new(code("140120"), DisplayOption::Fit));
        assert_eq!(f.calls(), [f.call_for("140120", "fit")]);
        earlier.assert_async().await;
    }

    #[tokio::test]
    async fn load_period_backfills_from_today() {
        let mut server = Server::new_async().await;
        let _page = server
            .mock("GET", "/apod/ap140120.html")
            .with_body(r#"<a href="image/1401/a.gif">"#)
            .create_async()
            .await;
        let _image = server
            .mock("GET", "/apod/image/1401/a.gif")
            .with_body("gif")
            .create_async()
            .await;
        let f = Fixture::new().with_site(&server);

        f.front.load_period(1).await.unwrap();

        assert!(f.front.store().is_present(code("140120")).unwrap());
        assert!(f.calls().is_empty());
    }

    #[derive(Clone, Default)]
    struct Counting(std::rc::Rc<std::cell::Cell<usize>>);

    impl WallpaperSetter for Counting {
        fn set_wallpaper(&self, _path: &std::path::Path, _option: DisplayOption) -> Result<()> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn jump_runs_setter_once_in_range_and_never_out_of_range() {
        let mut f = Fixture::new()
            .wallpapers(&["140120", "140121", "140122"])
            .showing("140121", DisplayOption::Fit);
        let counter = Counting::default();
        f.front = f.front.with_setter(counter.clone());

        f.front.jump(1).unwrap();
        assert_eq!(counter.0.get(), 1);
        assert!(f.front.jump(1).is_err());
        assert!(f.front.jump(-3).is_err());
        assert_eq!(counter.0.get(), 1);
        assert!(f.calls().is_empty());
    }

    #[test]
    fn display_current_on_fresh_setup_writes_state() {
        let f = Fixture::new().wallpapers(&["140121"]).script(SUCCEED);
        f.front.display_current().unwrap();
        assert!(f.raw_state().is_some());
    }
}
