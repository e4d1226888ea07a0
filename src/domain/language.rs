//! Supported languages and the static localized texts.

use super::risk::{Advisory, Condition, RiskPercent};

/// Languages the service can answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    EnUs,
    HiIn,
    TeIn,
}

/// Severity band of canned advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceBand {
    Low,
    High,
}

struct DefaultTexts {
    future_risks: &'static str,
    precautions: &'static str,
    causes: &'static str,
    reduction_steps: &'static str,
    diet_plan: &'static str,
}

const EN_DEFAULTS: DefaultTexts = DefaultTexts {
    future_risks: "Based on risk levels, untreated conditions may worsen.",
    precautions: "Maintain a balanced diet and exercise regularly.",
    causes: "Further diagnosis required for specific causes.",
    reduction_steps: "Standard health optimization requested.",
    diet_plan: "Universal healthy diet recommended.",
};

const HI_DEFAULTS: DefaultTexts = DefaultTexts {
    future_risks: "जोखिम के स्तरों के आधार पर, अनुपचारित स्थितियां खराब हो सकती हैं।",
    precautions: "संतुलित आहार बनाए रखें और नियमित व्यायाम करें।",
    causes: "विशिष्ट कारणों के लिए और निदान की आवश्यकता है।",
    reduction_steps: "मानक स्वास्थ्य अनुकूलन का अनुरोध किया गया।",
    diet_plan: "सार्वभौमिक स्वास्थ्य आहार की सिफारिश की गई।",
};

const TE_DEFAULTS: DefaultTexts = DefaultTexts {
    future_risks: "ప్రమాద స్థాయిల ఆధారంగా, చికిత్స చేయని పరిస్థితులు అధ్వాన్నంగా మారవచ్చు.",
    precautions: "సమతుల్య ఆహారం తీసుకోండి మరియు క్రమం తప్పకుండా వ్యాయామం చేయండి.",
    causes: "నిర్దిష్ట కారణాల కోసం మరిన్ని పరీక్షలు అవసరం.",
    reduction_steps: "ప్రామాణిక ఆరోగ్య ఆప్టిమైజేషన్ అభ్యర్థించబడింది.",
    diet_plan: "సార్వత్రిక ఆరోగ్యకరమైన ఆహారం సిఫార్సు చేయబడింది.",
};

/// English fallbacks for fields a live extraction response leaves out.
pub const FALLBACK_RECOMMENDATION: &str = "Maintain a healthy lifestyle.";
pub const FALLBACK_FUTURE_RISKS: &str = "Potential health complications if untreated.";
pub const FALLBACK_PRECAUTIONS: &str = "Consult a doctor for specific preventive measures.";
pub const FALLBACK_CAUSES: &str = "Lifestyle or biological factors.";
pub const FALLBACK_REDUCTION_STEPS: &str = "Medical management and lifestyle adjustments.";
pub const FALLBACK_DIET_PLAN: &str = "Balanced nutrition based on risk levels.";

/// Fixed English texts the mock extractor pairs with its localized advice.
pub const MOCK_FUTURE_RISKS: &str = "Complications depend on lifestyle choices.";
pub const MOCK_PRECAUTIONS: &str = "Monitor vitals regularly.";
pub const MOCK_CAUSES: &str = "May include environmental and genetic factors.";
pub const MOCK_DIET_PLAN: &str = "Specific diet based on your risk profile.";

impl Language {
    /// Map a BCP-47 style code; unknown codes fall back to `en-US`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "hi-IN" => Self::HiIn,
            "te-IN" => Self::TeIn,
            _ => Self::EnUs,
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::HiIn => "hi-IN",
            Self::TeIn => "te-IN",
        }
    }

    /// Human name handed to the language model.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::EnUs => "English",
            Self::HiIn => "Hindi",
            Self::TeIn => "Telugu",
        }
    }

    fn defaults(self) -> &'static DefaultTexts {
        match self {
            Self::EnUs => &EN_DEFAULTS,
            Self::HiIn => &HI_DEFAULTS,
            Self::TeIn => &TE_DEFAULTS,
        }
    }

    /// Advisory used when no extraction step ran or it was unavailable.
    ///
    /// The recommendation stays in English for every language.
    #[must_use]
    pub fn default_advisory(self) -> Advisory {
        let t = self.defaults();
        Advisory {
            recommendation: FALLBACK_RECOMMENDATION.to_string(),
            future_risks: t.future_risks.to_string(),
            precautions: t.precautions.to_string(),
            causes: t.causes.to_string(),
            reduction_steps: t.reduction_steps.to_string(),
            diet_plan: t.diet_plan.to_string(),
        }
    }

    /// Canned `(recommendation, reduction_steps)` pair for the mock extractor.
    #[must_use]
    pub fn mock_advice(self, band: AdviceBand) -> (&'static str, &'static str) {
        match (self, band) {
            (Self::EnUs, AdviceBand::Low) => (
                "Your risk levels are low. Maintain a balanced diet and regular exercise.",
                "1. Stay active.\n2. Eat greens.\n3. Annual wellness check.",
            ),
            (Self::EnUs, AdviceBand::High) => (
                "High risk detected. Consult a doctor immediately for a detailed screening.",
                "1. Immediate consultation.\n2. Diagnostic tests.\n3. Medication review.",
            ),
            (Self::HiIn, AdviceBand::Low) => (
                "आपका जोखिम स्तर कम है। संतुलित आहार और नियमित व्यायाम बनाए रखें।",
                "1. सक्रिय रहें।\n2. हरी सब्जियां खाएं।\n3. वार्षिक स्वास्थ्य जांच।",
            ),
            (Self::HiIn, AdviceBand::High) => (
                "उच्च जोखिम का पता चला। विस्तृत जांच के लिए तुरंत डॉक्टर से सलाह लें।",
                "1. तत्काल परामर्श।\n2. नैदानिक परीक्षण।\n3. दवा की समीक्षा।",
            ),
            (Self::TeIn, AdviceBand::Low) => (
                "మీ ప్రమాద స్థాయిలు తక్కువగా ఉన్నాయి. సమతుల్య ఆహారం మరియు క్రమం తప్పకుండా వ్యాయామం చేయండి.",
                "1. యాక్టివ్ గా ఉండండి.\n2. ఆకుకూరలు తినండి.\n3. వార్షిక ఆరోగ్య పరీక్ష.",
            ),
            (Self::TeIn, AdviceBand::High) => (
                "అధిక ప్రమాదం గుర్తించబడింది. వివరణాత్మక స్క్రీనింగ్ కోసం వెంటనే వైద్యుడిని సంప్రదించండి.",
                "1. తక్షణ సంప్రదింపు.\n2. రోగనిర్ధారణ పరీక్షలు.\n3. మందుల సమీక్ష.",
            ),
        }
    }

    /// SMS body announcing high-risk conditions with a report link.
    #[must_use]
    pub fn alert_message(self, risks: &[(Condition, RiskPercent)], report_link: &str) -> String {
        let listed = risks
            .iter()
            .map(|(condition, risk)| format!("{} ({})", condition.label(), risk))
            .collect::<Vec<_>>()
            .join(", ");

        match self {
            Self::HiIn => format!(
                "हीलिक्स एआई अलर्ट: उच्च स्वास्थ्य जोखिम का पता चला है: {listed}। रिपोर्ट देखें: {report_link}"
            ),
            Self::TeIn => format!(
                "హీలిక్స్ AI అలర్ట్: అధిక ఆరోగ్య ప్రమాదం గుర్తించబడింది: {listed}. రిపోర్ట్ చూడండి: {report_link}"
            ),
            Self::EnUs => format!(
                "HEALIX AI ALERT: High health risk detected: {listed}. View Report: {report_link}"
            ),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
