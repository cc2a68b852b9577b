//! Configuration record memory maps.
//!
//! The record is not self-describing: there is no version tag and no field
//! header, so the tables below must match the firmware byte for byte. A
//! table is an ordered list of fields; offsets are implied by the widths of
//! the fields before it.

/// Fill byte of the unused tail of the record (erased flash).
pub const RESERVED_FILL: u8 = 0xFF;

/// How a field is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Big-endian unsigned integer of 1 to 4 bytes.
    UInt(usize),
    /// ASCII text, NUL-padded to the width.
    Text(usize),
    /// Raw bytes.
    Bytes(usize),
    /// Filler with a canonical byte value.
    Reserved { width: usize, fill: u8 },
}

impl FieldKind {
    /// Number of bytes the field occupies.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::UInt(w) | Self::Text(w) | Self::Bytes(w) | Self::Reserved { width: w, .. } => w,
        }
    }

    /// Short name of the kind, for error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UInt(_) => "integer",
            Self::Text(_) => "text",
            Self::Bytes(_) => "byte",
            Self::Reserved { .. } => "reserved",
        }
    }
}

/// One named field of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name.
    pub name: &'static str,
    /// Storage kind and width.
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn uint(name: &'static str, width: usize) -> Self {
        Self {
            name,
            kind: FieldKind::UInt(width),
        }
    }

    const fn text(name: &'static str, width: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Text(width),
        }
    }

    const fn bytes(name: &'static str, width: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Bytes(width),
        }
    }

    const fn reserved(name: &'static str, width: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Reserved {
                width,
                fill: RESERVED_FILL,
            },
        }
    }
}

/// A complete configuration record map.
#[derive(Debug, PartialEq, Eq)]
pub struct Layout {
    /// Human-readable name.
    pub name: &'static str,
    /// Fields in record order.
    pub fields: &'static [FieldSpec],
}

impl Layout {
    /// Total record size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].kind.width();
            i += 1;
        }
        total
    }

    /// Index and spec of the field called `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<(usize, &FieldSpec)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    /// Byte offset of the field called `name`.
    #[must_use]
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let (index, _) = self.field(name)?;
        Some(
            self.fields[..index]
                .iter()
                .map(|f| f.kind.width())
                .sum(),
        )
    }
}

// Both firmware families share every field; only the Wi-Fi text widths and
// the reserved tail differ.
macro_rules! gmc_fields {
    (
        ssid: $ssid:expr,
        password: $password:expr,
        website: $website:expr,
        url: $url:expr,
        user_id: $user_id:expr,
        counter_id: $counter_id:expr,
        unused: $unused:expr $(,)?
    ) => {
        &[
            FieldSpec::uint("power", 1),
            FieldSpec::uint("alarm", 1),
            FieldSpec::uint("speaker", 1),
            FieldSpec::uint("idle_display_mode", 1),
            FieldSpec::uint("back_light_timeout_seconds", 1),
            FieldSpec::uint("idle_title_display_mode", 1),
            FieldSpec::uint("alarm_cpm_value", 2),
            FieldSpec::uint("calib_cpm_0", 2),
            FieldSpec::uint("calib_usv_0", 4),
            FieldSpec::uint("calib_cpm_1", 2),
            FieldSpec::uint("calib_usv_1", 4),
            FieldSpec::uint("calib_cpm_2", 2),
            FieldSpec::uint("calib_usv_2", 4),
            FieldSpec::uint("idle_text_state", 1),
            FieldSpec::uint("alarm_value_usv", 4),
            FieldSpec::uint("alarm_type", 1),
            FieldSpec::uint("save_data_type", 1),
            FieldSpec::uint("swivel_display", 1),
            FieldSpec::uint("zoom", 4),
            FieldSpec::uint("spi_data_save_address", 3),
            FieldSpec::uint("spi_data_read_address", 3),
            FieldSpec::uint("power_saving_mode", 1),
            FieldSpec::uint("sensitivity_mode", 1),
            FieldSpec::uint("counter_delay", 2),
            FieldSpec::uint("display_contrast", 1),
            FieldSpec::uint("max_cpm", 2),
            FieldSpec::uint("unknown1", 1),
            FieldSpec::uint("large_font_mode", 1),
            FieldSpec::uint("lcd_back_light_level", 1),
            FieldSpec::uint("reverse_display_mode", 1),
            FieldSpec::uint("motion_detect", 1),
            FieldSpec::uint("battery_type", 1),
            FieldSpec::uint("baudrate", 1),
            FieldSpec::uint("cpm_speaker_on_off_calib", 1),
            FieldSpec::uint("graphic_drawing_mode", 1),
            FieldSpec::uint("led_on_off", 1),
            FieldSpec::uint("unknown2", 1),
            FieldSpec::uint("save_threshold_value_usv_m_ncpm", 2),
            FieldSpec::uint("save_threshold_mode", 1),
            FieldSpec::uint("save_threshold_value", 4),
            FieldSpec::text("ssid", $ssid),
            FieldSpec::text("password", $password),
            FieldSpec::text("website", $website),
            FieldSpec::text("url", $url),
            FieldSpec::text("user_id", $user_id),
            FieldSpec::text("counter_id", $counter_id),
            FieldSpec::uint("period", 1),
            FieldSpec::uint("wifi_on_off", 1),
            FieldSpec::uint("text_status_mode", 1),
            FieldSpec::uint("fast_estimate_time", 1),
            FieldSpec::uint("third_party_output", 1),
            FieldSpec::uint("high_voltage_level_tube_1", 1),
            FieldSpec::uint("high_voltage_level_tube_2", 1),
            FieldSpec::uint("cpm_tube_mode", 1),
            FieldSpec::uint("cpm_tube_display", 1),
            FieldSpec::uint("voltage_display", 1),
            FieldSpec::uint("deadtime_enable", 1),
            FieldSpec::uint("deadtime_tube_1", 2),
            FieldSpec::uint("deadtime_tube_2", 2),
            FieldSpec::uint("medium_threshold", 2),
            FieldSpec::uint("high_threshold", 2),
            FieldSpec::uint("speaker_volume", 1),
            FieldSpec::uint("hv_reading", 1),
            FieldSpec::uint("target_hv", 2),
            FieldSpec::uint("hv_calib", 1),
            FieldSpec::bytes("ss1", 6),
            FieldSpec::bytes("ss2", 6),
            FieldSpec::bytes("ss3", 6),
            FieldSpec::bytes("ss4", 6),
            FieldSpec::uint("accuracy_display", 1),
            FieldSpec::uint("dose_alarm_0", 1),
            FieldSpec::uint("dose_alarm_1", 1),
            FieldSpec::uint("dose_alarm_2", 1),
            FieldSpec::uint("dose_alarm_3", 1),
            FieldSpec::bytes("save_date_time", 6),
            FieldSpec::reserved("unused", $unused),
        ]
    };
}

/// 256-byte record of firmware with compact Wi-Fi fields.
pub const GMC_256: Layout = Layout {
    name: "gmc-256",
    fields: gmc_fields!(
        ssid: 16,
        password: 16,
        website: 25,
        url: 12,
        user_id: 12,
        counter_id: 12,
        unused: 35,
    ),
};

/// 512-byte record of newer GMC-500/600 firmware.
pub const GMC_512: Layout = Layout {
    name: "gmc-512",
    fields: gmc_fields!(
        ssid: 64,
        password: 64,
        website: 32,
        url: 32,
        user_id: 32,
        counter_id: 32,
        unused: 128,
    ),
};

const _: () = assert!(GMC_256.size() == 256);
const _: () = assert!(GMC_512.size() == 512);
