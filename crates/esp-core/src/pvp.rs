/// Edge detector for entering PvP content.
///
/// The host calls [`PvpWatch::observe`] on login, logout and PvP enter/leave
/// events. It returns true once per PvP entry so the PvP notice is printed
/// a single time, not on every event while the player stays in PvP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PvpWatch {
    was_in_pvp: bool,
}

impl PvpWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, logged_in: bool, in_pvp: bool) -> bool {
        if !logged_in || !in_pvp {
            self.was_in_pvp = false;
            return false;
        }
        if self.was_in_pvp {
            return false;
        }
        self.was_in_pvp = true;
        tracing::info!("Entered PvP content");
        true
    }
}
