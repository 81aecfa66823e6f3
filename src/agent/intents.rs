//! The supported intents and their fixed instructions.

use serde::Serialize;

/// A role the service can answer as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    GeneralInformation,
    Rooms,
    LegalFinance,
    Other,
    Sentiment,
    Chat,
}

/// Everything that differs between two intents.
#[derive(Debug)]
pub struct IntentProfile {
    pub intent: Intent,
    /// Short id used in config and logs
    pub id: &'static str,
    /// HTTP paths served by this intent
    pub routes: &'static [&'static str],
    pub instruction: &'static str,
    /// Prompt used when the caller sends none
    pub default_prompt: &'static str,
    /// Document store agent whose documents ground the instruction
    pub grounding_agent: Option<&'static str>,
}

/// Agent id holding the general-information reference documents.
pub const GENERAL_INFORMATION_AGENT: &str = "informations_generales";

const GENERAL_INFORMATION_INSTRUCTION: &str = concat!(
    "Tu es un assistant spécialisé en fourniture d'informations générales sur l'Université Bordeaux Montaigne. ",
    "Réponds aux questions concernant les étudiants, enseignants, programmes, infrastructures et tout autre aspect général. ",
    "Réponds toujours de manière concise et factuelle."
);

const ROOMS_INSTRUCTION: &str = concat!(
    "Tu es un assistant spécialisé dans la gestion et la réservation des salles de l'Université Bordeaux Montaigne. ",
    "Fournis des informations sur les capacités, équipements et disponibilités des salles. ",
    "Réponds toujours de manière claire et structurée."
);

const LEGAL_FINANCE_INSTRUCTION: &str = concat!(
    "Tu es un assistant juridique spécialisé pour l'Université Bordeaux Montaigne. ",
    "Réponds aux questions sur les aspects juridiques, contrats, réglementations et autres informations pertinentes. ",
    "Réponds toujours avec précision et dans le cadre des réglementations actuelles."
);

const OTHER_INSTRUCTION: &str = concat!(
    "Tu es un assistant conçu pour traiter toutes les demandes ne relevant pas des autres agents. ",
    "Si la demande ne peut pas être satisfaite, réponds : \"Non, impossible.\" ",
    "Sinon, essaie de guider l'utilisateur vers une ressource appropriée ou donne une réponse générique utile."
);

const SENTIMENT_INSTRUCTION: &str = concat!(
    "Tu es un assistant spécialisé en analyse de sentiment.",
    " Pour chaque texte donné, détermine si le sentiment est POSITIF, NÉGATIF ou NEUTRE.",
    " Réponds toujours sous forme de dictionnaire JSON avec les clés suivantes :",
    " {",
    "   'sentiment': '<POSITIVE|NEGATIVE|NEUTRAL>',",
    "   'confidence': <float>,",
    "   'reason': 'explication du choix'",
    " }"
);

const CHAT_INSTRUCTION: &str = concat!(
    "Tu es un chatbot d'accueil.",
    " Ton rôle est d'interagir avec l'utilisateur pour comprendre sa demande,",
    " qualifier son intention en utilisant les points d'entrée '/demande' et '/sentiment',",
    " et récupérer les informations pertinentes pour contextualiser sa demande."
);

pub static INTENTS: [IntentProfile; 6] = [
    IntentProfile {
        intent: Intent::GeneralInformation,
        id: "infos",
        routes: &["/infos"],
        instruction: GENERAL_INFORMATION_INSTRUCTION,
        default_prompt: "Que puis-je faire pour vous ?",
        grounding_agent: Some(GENERAL_INFORMATION_AGENT),
    },
    IntentProfile {
        intent: Intent::Rooms,
        id: "salles",
        routes: &["/salles"],
        instruction: ROOMS_INSTRUCTION,
        default_prompt: "Quelles salles sont disponibles ?",
        grounding_agent: None,
    },
    IntentProfile {
        intent: Intent::LegalFinance,
        id: "finances",
        routes: &["/finances", "/juridique"],
        instruction: LEGAL_FINANCE_INSTRUCTION,
        default_prompt: "Quels sont les aspects juridiques à connaître ?",
        grounding_agent: None,
    },
    IntentProfile {
        intent: Intent::Other,
        id: "autres",
        routes: &["/autres"],
        instruction: OTHER_INSTRUCTION,
        default_prompt: "Puis-je vous aider avec autre chose ?",
        grounding_agent: None,
    },
    IntentProfile {
        intent: Intent::Sentiment,
        id: "sentiments",
        routes: &["/sentiments"],
        instruction: SENTIMENT_INSTRUCTION,
        default_prompt: "Que puis-je faire pour vous ?",
        grounding_agent: None,
    },
    IntentProfile {
        intent: Intent::Chat,
        id: "chat",
        routes: &["/chat"],
        instruction: CHAT_INSTRUCTION,
        default_prompt: "Que puis-je faire pour vous ?",
        grounding_agent: None,
    },
];

impl Intent {
    pub fn profile(self) -> &'static IntentProfile {
        let index = match self {
            Self::GeneralInformation => 0,
            Self::Rooms => 1,
            Self::LegalFinance => 2,
            Self::Other => 3,
            Self::Sentiment => 4,
            Self::Chat => 5,
        };
        &INTENTS[index]
    }

    pub fn id(self) -> &'static str {
        self.profile().id
    }

    /// Resolve a config id (`infos`, `salles`, ...). Route names without the
    /// leading slash are accepted too (`juridique`).
    pub fn from_id(id: &str) -> Option<Self> {
        INTENTS
            .iter()
            .find(|p| {
                p.id == id
                    || p
                        .routes
                        .iter()
                        .any(|r| r.trim_start_matches('/') == id)
            })
            .map(|p| p.intent)
    }

    pub fn all() -> impl Iterator<Item = Intent> {
        INTENTS.iter().map(|p| p.intent)
    }
}
