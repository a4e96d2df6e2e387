#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    pub checked: &'static str,
    pub unchecked: &'static str,
    pub cursor: &'static str,
    pub arrow_left: &'static str,
    pub arrow_right: &'static str,
    pub spinner: &'static str,
}

pub fn select(fancy_requested: bool) -> Glyphs {
    if fancy_requested {
        fancy()
    } else {
        ascii()
    }
}

fn ascii() -> Glyphs {
    Glyphs {
        checked: "[x]",
        unchecked: "[ ]",
        cursor: "_",
        arrow_left: "<",
        arrow_right: ">",
        spinner: "...",
    }
}

fn fancy() -> Glyphs {
    Glyphs {
        checked: "☑",
        unchecked: "☐",
        cursor: "█",
        arrow_left: "←",
        arrow_right: "→",
        spinner: "…",
    }
}
