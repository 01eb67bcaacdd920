// ==========================================
// Console Orientation - Résolution des entités référencées
// ==========================================
// Responsabilité : rapprocher les noms d'entités cités par
// les lignes (secteur, entreprise) des enregistrements du
// magasin, et garantir qu'une entité inconnue n'est créée
// qu'UNE seule fois par job, quel que soit le nombre de
// lignes qui la citent.
// Le plan appartient au job qui l'a construit ; il n'est
// jamais partagé entre jobs.
// ==========================================

use std::collections::{HashMap, HashSet};

// ==========================================
// ReferenceKey - Clé de rapprochement
// ==========================================
/// Forme canonique d'un nom d'entité : rognage, minuscules,
/// espaces intérieurs condensés. Les accents sont CONSERVÉS
/// (« Bâtiment » et « Batiment » restent deux clés) : le
/// rapprochement ne doit pas fusionner deux raisons sociales
/// réellement distinctes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceKey(String);

impl ReferenceKey {
    pub fn from_label(label: &str) -> Self {
        let folded = label.to_lowercase();
        Self(folded.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// Resolution - État d'une clé dans le plan
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<S> {
    /// Rapprochée d'un enregistrement déjà en magasin
    Existing(i64),
    /// Inconnue : création planifiée avec cette amorce
    Pending(S),
    /// Créée pendant ce job
    Created(i64),
    /// Tentative de création échouée ; les lignes qui la
    /// citent échouent avec ce motif
    Failed(String),
}

// ==========================================
// ResolutionPlan - Plan de résolution d'un job
// ==========================================
/// Une entrée par clé distincte ; l'unicité de création
/// tient à la structure : une clé inconnue n'est mise en
/// attente qu'à sa première rencontre, puis bascule
/// Created ou Failed une seule fois
#[derive(Debug)]
pub struct ResolutionPlan<S> {
    entity: &'static str, // libellé du type d'entité, porté par les motifs d'échec
    entries: HashMap<ReferenceKey, Resolution<S>>,
    pending_order: Vec<ReferenceKey>, // ordre de première rencontre
}

impl<S: Clone> ResolutionPlan<S> {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            entries: HashMap::new(),
            pending_order: Vec::new(),
        }
    }

    /// Charge l'index du magasin (id, libellé).
    /// Si deux enregistrements se replient sur la même clé,
    /// le premier id rencontré l'emporte
    pub fn preload<I>(&mut self, existing: I)
    where
        I: IntoIterator<Item = (i64, String)>,
    {
        for (id, label) in existing {
            let key = ReferenceKey::from_label(&label);
            self.entries.entry(key).or_insert(Resolution::Existing(id));
        }
    }

    /// Met en file une référence rencontrée sur une ligne.
    /// Première rencontre d'une clé inconnue : l'amorce est
    /// construite et retenue ; rencontres suivantes : aucune
    /// modification (la première ligne gagne)
    pub fn stage<F>(&mut self, label: &str, seed: F) -> ReferenceKey
    where
        F: FnOnce() -> S,
    {
        let key = ReferenceKey::from_label(label);
        if !self.entries.contains_key(&key) {
            self.entries.insert(key.clone(), Resolution::Pending(seed()));
            self.pending_order.push(key.clone());
        }
        key
    }

    /// Clés en attente de création, dans l'ordre de première
    /// rencontre, avec leur amorce
    pub fn pending(&self) -> Vec<(ReferenceKey, S)> {
        self.pending_order
            .iter()
            .filter_map(|key| match self.entries.get(key) {
                Some(Resolution::Pending(seed)) => Some((key.clone(), seed.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn mark_created(&mut self, key: &ReferenceKey, id: i64) {
        self.entries.insert(key.clone(), Resolution::Created(id));
    }

    pub fn mark_failed(&mut self, key: &ReferenceKey, message: impl Into<String>) {
        self.entries
            .insert(key.clone(), Resolution::Failed(message.into()));
    }

    /// Id utilisable pour la clé : enregistrement existant
    /// ou créé pendant ce job
    pub fn resolved_id(&self, key: &ReferenceKey) -> Option<i64> {
        match self.entries.get(key) {
            Some(Resolution::Existing(id)) | Some(Resolution::Created(id)) => Some(*id),
            _ => None,
        }
    }

    /// Motif d'échec de création, si la clé a échoué
    pub fn failure(&self, key: &ReferenceKey) -> Option<&str> {
        match self.entries.get(key) {
            Some(Resolution::Failed(message)) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Id utilisable pour le libellé cité par une ligne, ou
    /// motif d'échec prêt à porter par cette ligne
    pub fn require(&self, label: &str) -> Result<i64, String> {
        let key = ReferenceKey::from_label(label);
        if let Some(id) = self.resolved_id(&key) {
            return Ok(id);
        }
        match self.failure(&key) {
            Some(message) => Err(format!(
                "{} « {label} » indisponible : {message}",
                self.entity
            )),
            None => Err(format!("{} « {label} » introuvable", self.entity)),
        }
    }

    /// Nombre d'entités créées pendant ce job
    pub fn created_count(&self) -> usize {
        self.entries
            .values()
            .filter(|r| matches!(r, Resolution::Created(_)))
            .count()
    }
}

// ==========================================
// KeyIndex - Index de doublons
// ==========================================
/// Ensemble de clés déjà vues, pour écarter les lignes
/// entreprise en double (dans le fichier ou déjà en magasin)
#[derive(Debug, Default)]
pub struct KeyIndex {
    keys: HashSet<ReferenceKey>,
}

impl KeyIndex {
    pub fn from_labels<I, T>(labels: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            keys: labels
                .into_iter()
                .map(|label| ReferenceKey::from_label(label.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, key: &ReferenceKey) -> bool {
        self.keys.contains(key)
    }

    /// Retourne false si la clé était déjà présente
    pub fn insert(&mut self, key: ReferenceKey) -> bool {
        self.keys.insert(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_key_folds_case_and_spaces() {
        assert_eq!(
            ReferenceKey::from_label("  Acme   SARL "),
            ReferenceKey::from_label("acme sarl")
        );
        assert_eq!(ReferenceKey::from_label("ACME Sarl").as_str(), "acme sarl");
    }

    #[test]
    fn test_reference_key_keeps_accents() {
        // Deux raisons sociales réellement distinctes ne
        // doivent pas fusionner
        assert_ne!(
            ReferenceKey::from_label("Bâtiment Durand"),
            ReferenceKey::from_label("Batiment Durand")
        );
    }

    #[test]
    fn test_stage_creates_one_pending_per_distinct_key() {
        let mut plan: ResolutionPlan<String> = ResolutionPlan::new("secteur");
        plan.stage("Acme", || "Acme".to_string());
        plan.stage(" ACME ", || "jamais construit".to_string());
        plan.stage("acme", || "jamais construit".to_string());
        plan.stage("Globex", || "Globex".to_string());

        let pending = plan.pending();
        assert_eq!(pending.len(), 2);
        // Ordre de première rencontre, amorce de la première ligne
        assert_eq!(pending[0].0.as_str(), "acme");
        assert_eq!(pending[0].1, "Acme");
        assert_eq!(pending[1].0.as_str(), "globex");
    }

    #[test]
    fn test_preloaded_keys_are_never_staged() {
        let mut plan: ResolutionPlan<String> = ResolutionPlan::new("secteur");
        plan.preload(vec![(7, "Industrie".to_string())]);

        let key = plan.stage("INDUSTRIE", || "jamais construit".to_string());
        assert!(plan.pending().is_empty());
        assert_eq!(plan.resolved_id(&key), Some(7));
    }

    #[test]
    fn test_preload_keeps_first_id_on_key_collision() {
        let mut plan: ResolutionPlan<String> = ResolutionPlan::new("secteur");
        plan.preload(vec![(1, "Industrie".to_string()), (2, " industrie ".to_string())]);

        let key = ReferenceKey::from_label("Industrie");
        assert_eq!(plan.resolved_id(&key), Some(1));
    }

    #[test]
    fn test_mark_created_and_failed_transitions() {
        let mut plan: ResolutionPlan<String> = ResolutionPlan::new("entreprise");
        let acme = plan.stage("Acme", || "Acme".to_string());
        let globex = plan.stage("Globex", || "Globex".to_string());

        plan.mark_created(&acme, 41);
        plan.mark_failed(&globex, "le magasin a refusé la création");

        assert_eq!(plan.resolved_id(&acme), Some(41));
        assert_eq!(plan.resolved_id(&globex), None);
        assert_eq!(plan.failure(&globex), Some("le magasin a refusé la création"));
        assert_eq!(plan.created_count(), 1);
        // Plus rien en attente après les transitions
        assert!(plan.pending().is_empty());
    }

    #[test]
    fn test_require_carries_entity_label_in_motive() {
        let mut plan: ResolutionPlan<String> = ResolutionPlan::new("secteur");
        plan.preload(vec![(9, "Industrie".to_string())]);
        let tourisme = plan.stage("Tourisme", || "Tourisme".to_string());
        plan.mark_failed(&tourisme, "le magasin a refusé la création");

        assert_eq!(plan.require(" INDUSTRIE "), Ok(9));

        let motive = plan.require("Tourisme").expect_err("clé en échec");
        assert!(motive.contains("secteur « Tourisme »"));
        assert!(motive.contains("le magasin a refusé la création"));

        let absent = plan.require("Artisanat").expect_err("clé jamais vue");
        assert!(absent.contains("introuvable"));
    }

    #[test]
    fn test_key_index_detects_duplicates() {
        let mut index = KeyIndex::from_labels(["Acme SARL"]);
        assert!(index.contains(&ReferenceKey::from_label(" acme  sarl ")));
        assert!(index.insert(ReferenceKey::from_label("Globex")));
        assert!(!index.insert(ReferenceKey::from_label("GLOBEX")));
    }
}
