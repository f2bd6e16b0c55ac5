//! References (HEAD, branches, tags)
//!
//! A ref file contains either a 40-hex object id (direct) or `ref: <path>`
//! (symbolic, resolved recursively with a bounded hop count). Name resolution
//! layers an ordered list of candidate strategies on top: literal `HEAD`, a
//! full hash, the `refs/*` search paths, and finally abbreviated-hash lookup
//! in the object database. All ref candidates are collected before deciding,
//! so a name shadowed by several refs is reported as ambiguous instead of
//! silently picking one.

use crate::areas::database::Database;
use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::errors::CoreError;
use anyhow::Context;
use derive_new::new;
use std::collections::BTreeMap;
use std::path::Path;

/// Regex pattern for symbolic reference contents
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

/// Maximum symbolic-ref indirection depth before reporting a cycle
const MAX_SYMREF_HOPS: usize = 10;

/// Search paths tried, in order, when a name is resolved. The literal
/// pattern lets fully qualified paths such as `refs/heads/main` through.
const REF_SEARCH_PATTERNS: [&str; 6] = [
    "{}",
    "refs/{}",
    "refs/tags/{}",
    "refs/heads/{}",
    "refs/remotes/{}",
    "refs/remotes/{}/HEAD",
];

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the git directory holding `HEAD` and `refs/`
    path: Box<Path>,
}

/// Contents of one ref file
#[derive(Debug, Clone)]
enum RefValue {
    Symbolic(String),
    Direct(ObjectId),
}

impl RefValue {
    fn read(path: &Path) -> anyhow::Result<Option<RefValue>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(CoreError::Storage)?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(RefValue::Symbolic(symref_match[1].to_string())))
        } else {
            Ok(Some(RefValue::Direct(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }
}

/// Hierarchical view of the ref namespace, for listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefNode {
    Leaf(ObjectId),
    Dir(BTreeMap<String, RefNode>),
}

impl Refs {
    /// Follow a ref path (e.g. `HEAD`, `refs/heads/main`) through symbolic
    /// indirection to an object id. Returns `None` when the chain ends at a
    /// ref file that does not exist yet (an unborn branch).
    pub fn read_ref(&self, ref_path: &str) -> anyhow::Result<Option<ObjectId>> {
        let mut current = ref_path.to_string();

        for _ in 0..MAX_SYMREF_HOPS {
            match RefValue::read(&self.path.join(&current))? {
                Some(RefValue::Symbolic(target)) => current = target,
                Some(RefValue::Direct(oid)) => return Ok(Some(oid)),
                None => return Ok(None),
            }
        }

        Err(CoreError::RefCycle(MAX_SYMREF_HOPS).into())
    }

    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.read_ref(HEAD_REF_NAME)
    }

    /// Resolve a user-supplied name to an object id.
    ///
    /// Precedence: literal `HEAD`; a full 40-hex id of a stored object; the
    /// candidate paths (the name itself and the `refs/*` expansions, all
    /// collected first, several distinct targets is an error);
    /// abbreviated-hash lookup as the last resort.
    pub fn resolve(&self, name: &str, database: &Database) -> anyhow::Result<ObjectId> {
        let name = name.trim();

        if name == HEAD_REF_NAME {
            return self
                .read_head()?
                .ok_or_else(|| CoreError::NotFound(HEAD_REF_NAME.to_string()).into());
        }

        if name.len() == 40
            && name.chars().all(|c| c.is_ascii_hexdigit())
            && let Ok(oid) = ObjectId::try_parse(name.to_string())
            && database.contains(&oid)
        {
            return Ok(oid);
        }

        let mut candidates: Vec<(String, ObjectId)> = Vec::new();
        for pattern in REF_SEARCH_PATTERNS {
            let ref_path = pattern.replace("{}", name);
            // candidate paths must stay inside the git directory
            if Path::new(&ref_path)
                .components()
                .any(|c| !matches!(c, std::path::Component::Normal(_)))
            {
                continue;
            }
            if !self.path.join(&ref_path).exists() {
                continue;
            }
            if let Some(oid) = self.read_ref(&ref_path)? {
                candidates.push((ref_path, oid));
            }
        }

        let mut distinct: Vec<&ObjectId> = Vec::new();
        for (_, oid) in &candidates {
            if !distinct.contains(&oid) {
                distinct.push(oid);
            }
        }

        match distinct.len() {
            1 => Ok(distinct[0].clone()),
            0 => {
                if ObjectId::is_prefix_candidate(name) {
                    database.resolve_prefix(name)
                } else {
                    Err(CoreError::NotFound(name.to_string()).into())
                }
            }
            _ => Err(CoreError::AmbiguousReference {
                name: name.to_string(),
                candidates: candidates.into_iter().map(|(path, _)| path).collect(),
            }
            .into()),
        }
    }

    /// Resolve a name and require the result to be of `expected` type,
    /// peeling annotated tags (and a commit's tree, when a tree is asked
    /// for) along the way.
    pub fn resolve_as(
        &self,
        name: &str,
        expected: ObjectType,
        database: &Database,
    ) -> anyhow::Result<ObjectId> {
        let mut oid = self.resolve(name, database)?;

        // tags may chain; the bound mirrors the symref hop limit
        for _ in 0..MAX_SYMREF_HOPS {
            let actual = database.object_type_of(&oid)?;
            if actual == expected {
                return Ok(oid);
            }

            oid = match actual {
                ObjectType::Tag => {
                    let tag = database
                        .parse_object_as_tag(&oid)?
                        .context("tag vanished during resolution")?;
                    tag.object_oid()?
                }
                ObjectType::Commit if expected == ObjectType::Tree => {
                    let commit = database
                        .parse_object_as_commit(&oid)?
                        .context("commit vanished during resolution")?;
                    commit.tree_oid()?
                }
                actual => {
                    return Err(CoreError::TypeMismatch {
                        oid: oid.to_string(),
                        expected: expected.as_str().to_string(),
                        actual: actual.as_str().to_string(),
                    }
                    .into());
                }
            };
        }

        Err(CoreError::RefCycle(MAX_SYMREF_HOPS).into())
    }

    /// Walk the `refs/` namespace recursively, preserving its directory
    /// structure.
    pub fn find_all(&self) -> anyhow::Result<BTreeMap<String, RefNode>> {
        self.collect_ref_dir(&self.refs_path())
    }

    fn collect_ref_dir(&self, dir: &Path) -> anyhow::Result<BTreeMap<String, RefNode>> {
        let mut nodes = BTreeMap::new();

        if !dir.is_dir() {
            return Ok(nodes);
        }

        for entry in std::fs::read_dir(dir).map_err(CoreError::Storage)? {
            let entry = entry.map_err(CoreError::Storage)?;
            let name = entry.file_name().to_string_lossy().to_string();
            let path = entry.path();

            if path.is_dir() {
                nodes.insert(name, RefNode::Dir(self.collect_ref_dir(&path)?));
            } else {
                let relative = path
                    .strip_prefix(self.path.as_ref())
                    .context("ref outside the git directory")?;
                if let Some(oid) = self.read_ref(&relative.to_string_lossy())? {
                    nodes.insert(name, RefNode::Leaf(oid));
                }
            }
        }

        Ok(nodes)
    }

    /// Write a direct ref. Parent directories are created as needed; the
    /// write itself is a plain truncate (per-ref atomicity is not required).
    pub fn create_ref(&self, ref_path: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let path = self.path.join(ref_path);
        std::fs::create_dir_all(path.parent().context("invalid ref path")?)
            .map_err(CoreError::Storage)?;
        std::fs::write(&path, format!("{}\n", oid.as_ref())).map_err(CoreError::Storage)?;

        Ok(())
    }

    /// Create a tag named `name` pointing at `target`. A lightweight tag is
    /// just a ref; an annotated one first stores a tag object and points the
    /// ref at it. Returns the id the ref ends up referencing.
    pub fn create_tag(
        &self,
        name: &str,
        target: &ObjectId,
        annotated: bool,
        message: Option<&str>,
        database: &Database,
    ) -> anyhow::Result<ObjectId> {
        let ref_target = if annotated {
            let target_type = database.object_type_of(target)?;
            let tag = Tag::new(
                name,
                target,
                target_type,
                Author::load_from_env(),
                message.unwrap_or("").to_string(),
            );
            database.store(&tag, true)?
        } else {
            target.clone()
        };

        self.create_ref(&format!("refs/tags/{name}"), &ref_target)?;
        Ok(ref_target)
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }
}
