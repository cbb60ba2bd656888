//! SM4 format constants and tag enumerations.
//!
//! Every tag stored in the file is a little-endian `u32`. Tags are decoded into
//! closed enums; values outside the known set land in an `Unknown(raw)`
//! variant so that newer files still decode. Only tags that steer decoding
//! ([`PageDataType`]) reject unknown values, see [`PageDataType::checked`].

use std::fmt;

use serde::Serialize;

/// Size of the fixed container header prefix (before the object index).
pub const CONTAINER_HEADER_SIZE: usize = 2 + SIGNATURE_LEN + 4 * 5;

/// Length of the fixed signature string in the container header.
pub const SIGNATURE_LEN: usize = 36;

/// Size of one `(tag, offset, size)` object record.
pub const OBJECT_RECORD_SIZE: usize = 12;

/// Size of a page record before its object index.
pub const PAGE_RECORD_SIZE: usize = 2 + PAGE_RECORD_RESERVED + 4 * 4;

/// Reserved bytes following the page id in a page record.
pub const PAGE_RECORD_RESERVED: usize = 14;

/// Reserved bytes at the end of a default page header.
pub const PAGE_HEADER_RESERVED: usize = 63;

/// Number of strings in a STRING_DATA object.
pub const STRING_DATA_COUNT: usize = 19;

/// Values of the PRM compression flag.
pub const PRM_UNCOMPRESSED: u32 = 0;

/// Generates a tag enum with an `Unknown(u32)` fallback, a raw conversion
/// pair and the RHK constant name used for `Display`.
macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal => $text:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )*
            /// Value not covered by this reader.
            Unknown(u32),
        }

        impl $name {
            /// Map a raw tag, keeping unrecognized values.
            pub const fn from_raw(value: u32) -> Self {
                match value {
                    $( $value => Self::$variant, )*
                    other => Self::Unknown(other),
                }
            }

            /// The raw tag as stored in the file.
            pub const fn raw(self) -> u32 {
                match self {
                    $( Self::$variant => $value, )*
                    Self::Unknown(other) => other,
                }
            }

            /// RHK constant name, without the common prefix.
            pub const fn name(self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )*
                    Self::Unknown(_) => "UNKNOWN",
                }
            }

            /// Whether the raw value was outside the known set.
            pub const fn is_unknown(self) -> bool {
                matches!(self, Self::Unknown(_))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    Self::Unknown(raw) => write!(f, "UNKNOWN({})", raw),
                    other => f.write_str(other.name()),
                }
            }
        }
    };
}

tag_enum! {
    /// Type tag of an object record.
    pub enum ObjectType {
        Undefined = 0 => "UNDEFINED",
        PageIndexHeader = 1 => "PAGE_INDEX_HEADER",
        PageIndexArray = 2 => "PAGE_INDEX_ARRAY",
        PageHeader = 3 => "PAGE_HEADER",
        PageData = 4 => "PAGE_DATA",
        ImageDriftHeader = 5 => "IMAGE_DRIFT_HEADER",
        ImageDrift = 6 => "IMAGE_DRIFT",
        SpecDriftHeader = 7 => "SPEC_DRIFT_HEADER",
        SpecDriftData = 8 => "SPEC_DRIFT_DATA",
        ColorInfo = 9 => "COLOR_INFO",
        StringData = 10 => "STRING_DATA",
        TipTrackHeader = 11 => "TIP_TRACK_HEADER",
        TipTrackData = 12 => "TIP_TRACK_DATA",
        Prm = 13 => "PRM",
        Thumbnail = 14 => "THUMBNAIL",
        PrmHeader = 15 => "PRM_HEADER",
        ThumbnailHeader = 16 => "THUMBNAIL_HEADER",
        ApiInfo = 17 => "API_INFO",
        HistoryInfo = 18 => "HISTORY_INFO",
        PiezoSensitivity = 19 => "PIEZO_SENSITIVITY",
        FrequencySweepData = 20 => "FREQUENCY_SWEEP_DATA",
        ScanProcessorInfo = 21 => "SCAN_PROCESSOR_INFO",
        PllInfo = 22 => "PLL_INFO",
        Ch1DriveInfo = 23 => "CH1_DRIVE_INFO",
        Ch2DriveInfo = 24 => "CH2_DRIVE_INFO",
        Lockin0Info = 25 => "LOCKIN0_INFO",
        Lockin1Info = 26 => "LOCKIN1_INFO",
        ZpiInfo = 27 => "ZPI_INFO",
        KpiInfo = 28 => "KPI_INFO",
        AuxPiInfo = 29 => "AUX_PI_INFO",
        LowpassFilter0Info = 30 => "LOWPASS_FILTER0_INFO",
        LowpassFilter1Info = 31 => "LOWPASS_FILTER1_INFO",
    }
}

tag_enum! {
    /// Kind of data stored in a page; selects the page header layout.
    pub enum PageDataType {
        Image = 0 => "IMAGE",
        Line = 1 => "LINE",
        XyData = 2 => "XY_DATA",
        AnnotatedLine = 3 => "ANNOTATED_LINE",
        Text = 4 => "TEXT",
        AnnotatedText = 5 => "ANNOTATED_TEXT",
        Sequential = 6 => "SEQUENTIAL",
        Movie = 7 => "MOVIE",
    }
}

impl PageDataType {
    /// Map a raw data-type tag, rejecting values outside the known set.
    ///
    /// The data type decides which header layout is read, so an unknown
    /// value leaves the page undecodable.
    pub fn checked(value: u32) -> Option<Self> {
        match Self::from_raw(value) {
            Self::Unknown(_) => None,
            known => Some(known),
        }
    }
}

tag_enum! {
    /// Origin of the page data.
    pub enum PageSourceType {
        Raw = 0 => "RAW",
        Processed = 1 => "PROCESSED",
        Calculated = 2 => "CALCULATED",
        Imported = 3 => "IMPORTED",
    }
}

tag_enum! {
    /// Physical quantity recorded by a page.
    pub enum PageType {
        Undefined = 0 => "UNDEFINED",
        Topographic = 1 => "TOPOGRAPHIC",
        Current = 2 => "CURRENT",
        Aux = 3 => "AUX",
        Force = 4 => "FORCE",
        Signal = 5 => "SIGNAL",
        FftTransform = 6 => "FFT_TRANSFORM",
        NoisePowerSpectrum = 7 => "NOISE_POWER_SPECTRUM",
        LineTest = 8 => "LINE_TEST",
        Oscilloscope = 9 => "OSCILLOSCOPE",
        IvSpectra = 10 => "IV_SPECTRA",
        Iv4x4 = 11 => "IV_4x4",
        Iv8x8 = 12 => "IV_8x8",
        Iv16x16 = 13 => "IV_16x16",
        Iv32x32 = 14 => "IV_32x32",
        IvCenter = 15 => "IV_CENTER",
        InteractiveSpectra = 16 => "INTERACTIVE_SPECTRA",
        Autocorrelation = 17 => "AUTOCORRELATION",
        IzSpectra = 18 => "IZ_SPECTRA",
        Gain4Topography = 19 => "4_GAIN_TOPOGRAPHY",
        Gain8Topography = 20 => "8_GAIN_TOPOGRAPHY",
        Gain4Current = 21 => "4_GAIN_CURRENT",
        Gain8Current = 22 => "8_GAIN_CURRENT",
        Iv64x64 = 23 => "IV_64x64",
        AutocorrelationSpectrum = 24 => "AUTOCORRELATION_SPECTRUM",
        Counter = 25 => "COUNTER",
        MultichannelAnalyser = 26 => "MULTICHANNEL_ANALYSER",
        Afm100 = 27 => "AFM_100",
        Cits = 28 => "CITS",
        Gpib = 29 => "GPIB",
        VideoChannel = 30 => "VIDEO_CHANNEL",
        ImageOutSpectra = 31 => "IMAGE_OUT_SPECTRA",
        IDatalog = 32 => "I_DATALOG",
        IEcset = 33 => "I_ECSET",
        IEcdata = 34 => "I_ECDATA",
        IDspAd = 35 => "I_DSP_AD",
        DiscreteSpectroscopyPp = 36 => "DISCRETE_SPECTROSCOPY_PP",
        ImageDiscreteSpectroscopy = 37 => "IMAGE_DISCRETE_SPECTROSCOPY",
        RampSpectroscopyRp = 38 => "RAMP_SPECTROSCOPY_RP",
        DiscreteSpectroscopyRp = 39 => "DISCRETE_SPECTROSCOPY_RP",
    }
}

tag_enum! {
    /// Line type of a page (what a 1-D trace represents).
    pub enum LineType {
        NotALine = 0 => "NOT_A_LINE",
        Histogram = 1 => "HISTOGRAM",
        CrossSection = 2 => "CROSS_SECTION",
        LineTest = 3 => "LINE_TEST",
        Oscilloscope = 4 => "OSCILLOSCOPE",
        Reserved = 5 => "RESERVED",
        NoisePowerSpectrum = 6 => "NOISE_POWER_SPECTRUM",
        IvSpectrum = 7 => "IV_SPECTRUM",
        IzSpectrum = 8 => "IZ_SPECTRUM",
        ImageXAverage = 9 => "IMAGE_X_AVERAGE",
        ImageYAverage = 10 => "IMAGE_Y_AVERAGE",
        NoiseAutocorrelationSpectrum = 11 => "NOISE_AUTOCORRELATION_SPECTRUM",
        MultichannelAnalyserData = 12 => "MULTICHANNEL_ANALYSER_DATA",
        RenormalizedIv = 13 => "RENORMALIZED_IV",
        ImageHistogramSpectra = 14 => "IMAGE_HISTOGRAM_SPECTRA",
        ImageCrossSection = 15 => "IMAGE_CROSS_SECTION",
        ImageAverage = 16 => "IMAGE_AVERAGE",
        ImageCrossSectionG = 17 => "IMAGE_CROSS_SECTION_G",
        ImageOutSpectra = 18 => "IMAGE_OUT_SPECTRA",
        DatalogSpectrum = 19 => "DATALOG_SPECTRUM",
        Gxy = 20 => "GXY",
        Electrochemistry = 21 => "ELECTROCHEMISTRY",
        DiscreteSpectroscopy = 22 => "DISCRETE_SPECTROSCOPY",
        DataLogger = 23 => "DATA_LOGGER",
        TimeSpectroscopy = 24 => "TIME_SPECTROSCOPY",
        ZoomFft = 25 => "ZOOM_FFT",
        FrequencySweep = 26 => "FREQUENCY_SWEEP",
        PhaseRotate = 27 => "PHASE_ROTATE",
        FiberSweep = 28 => "FIBER_SWEEP",
    }
}

tag_enum! {
    /// Image type of a page.
    pub enum ImageType {
        Normal = 0 => "NORMAL",
        Autocorrelated = 1 => "AUTOCORRELATED",
    }
}

tag_enum! {
    /// Scan direction of a page.
    pub enum ScanType {
        Right = 0 => "RIGHT",
        Left = 1 => "LEFT",
        Up = 2 => "UP",
        Down = 3 => "DOWN",
    }
}

tag_enum! {
    /// Drift correction mode recorded in drift headers.
    pub enum DriftOption {
        Disabled = 0 => "DISABLED",
        EachSpectra = 1 => "EACH_SPECTRA",
        EachLocation = 2 => "EACH_LOCATION",
    }
}
