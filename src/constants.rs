use serde::Serialize;

use crate::model::school::School;

// ========================================
// EVENT INFORMATION
// ========================================

#[derive(Debug, Serialize)]
pub struct Location {
    pub name: &'static str,
    pub address: &'static str,
    pub maps_url: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Verse {
    pub text: &'static str,
    pub reference: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Contact {
    pub name: &'static str,
    pub phone: &'static str,
    pub whatsapp: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EventInfo {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub open_gate: &'static str,
    pub start_time: &'static str,
    pub timezone: &'static str,
    pub location: Location,
    pub activities: &'static [&'static str],
    pub gift_minimum: &'static str,
    pub verse: Verse,
    pub instagram: &'static str,
    pub contact: Contact,
}

/// Event date (WIB = UTC+7), overridable with `EVENT_DATE`.
pub const EVENT_DATE: &str = "2026-01-15T15:30:00+07:00";

/// RSVP deadline, overridable with `RSVP_DEADLINE`.
pub const RSVP_DEADLINE: &str = "2025-12-31T23:59:59+07:00";

/// Offset used when rendering dates for people in Cibinong.
pub const WIB_OFFSET_SECS: i32 = 7 * 3600;

pub const EVENT_INFO: EventInfo = EventInfo {
    title: "Celebrate Christmas",
    subtitle: "Light Up Christmas With Christ",
    open_gate: "15:00",
    start_time: "15:30",
    timezone: "WIB",
    location: Location {
        name: "GBI Jl. Tapos Cibinong",
        address: "Jl. Tapos, Cibinong, Bogor, Jawa Barat",
        maps_url: "https://maps.app.goo.gl/vv6r27VM2pWK6zQi6",
    },
    activities: &["Praise and Worship", "Candle Light", "Games"],
    gift_minimum: "20K",
    verse: Verse {
        text: "Maka Yesus berkata pula kepada orang banyak, kata-Nya: \"Akulah terang dunia; barangsiapa mengikut Aku, ia tidak akan berjalan dalam kegelapan, melainkan ia akan mempunyai terang hidup.\"",
        reference: "Yohanes 8:12",
    },
    instagram: "@rohkris_penus",
    contact: Contact {
        name: "Panitia",
        phone: "+62 859-6727-9063",
        whatsapp: "https://wa.me/6285967279063",
    },
};

// ========================================
// CLASSES BY SCHOOL
// Format: Tingkat.Jurusan-Rombel
// ========================================

/// Free-text class marker; the real class lives in `class_other`.
pub const CLASS_OTHER: &str = "Lainnya";

pub const SMK_CLASSES: &[&str] = &[
    // RPL
    "X.RPL-1", "X.RPL-2",
    "XI.RPL-1", "XI.RPL-2",
    "XII.RPL-1", "XII.RPL-2", "XII.RPL-3",
    // TKJ
    "X.TKJ-1", "X.TKJ-2",
    "XI.TKJ-1", "XI.TKJ-2",
    "XII.TKJ-1", "XII.TKJ-2", "XII.TKJ-3",
    // DKV & MM
    "X.DKV-1", "X.DKV-2", "X.DKV-3", "X.DKV-4",
    "XI.DKV-1", "XI.DKV-2", "XI.DKV-3", "XI.DKV-4",
    "XII.MM-1", "XII.MM-2", "XII.MM-3", "XII.MM-4",
    // LPB & PKM
    "X.LPB-1", "X.LPB-2",
    "XI.LPB-1", "XI.LPB-2",
    "XII.PKM-1", "XII.PKM-2",
    // TOI
    "X.TOI-1",
    CLASS_OTHER,
];

pub const SMA_CLASSES: &[&str] = &[
    // IPA
    "X.IPA-1", "X.IPA-2",
    "XI.IPA-1", "XI.IPA-2",
    "XII.IPA-1", "XII.IPA-2",
    // IPS
    "X.IPS-1", "X.IPS-2",
    "XI.IPS-1", "XI.IPS-2",
    "XII.IPS-1", "XII.IPS-2",
    CLASS_OTHER,
];

const OTHER_ONLY: &[&str] = &[CLASS_OTHER];

pub fn classes_for_school(school: School) -> &'static [&'static str] {
    match school {
        School::Penus => SMK_CLASSES,
        School::Pesat => SMA_CLASSES,
        School::Other => OTHER_ONLY,
    }
}

// ========================================
// LOCAL STORAGE KEYS
// ========================================

pub const RSVP_DATA_KEY: &str = "christmas_rsvp_data";
pub const ADMIN_TOKEN_KEY: &str = "christmas_admin_token";
