use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use dispatch_proto::wire::{data_message::MessageMode, group_context::Type as GroupType};
use serde_json::{Map, Value};
use thiserror::Error;

use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },
    #[error("{0} is required")]
    Missing(String),
    #[error("{0} must not be empty")]
    Empty(String),
    #[error("recipients must hold exactly one entry when there is no group, found {0}")]
    RecipientCount(usize),
    #[error("end session message must not carry {0}")]
    EndSession(&'static str),
    #[error("recall source {found} is not the local account")]
    ForeignRecall { found: String },
    #[error("threadContext must be thread or topic compatible")]
    ThreadCompatibility,
}

impl ValidationError {
    /// Name of the offending field, as it appears in the field bag.
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidType { field, .. } => field,
            Self::Missing(field) | Self::Empty(field) => field,
            Self::RecipientCount(_) => "recipients",
            Self::EndSession(field) => field,
            Self::ForeignRecall { .. } => "recall.realSource.source",
            Self::ThreadCompatibility => "threadContext",
        }
    }

    fn invalid(field: String, expected: &'static str) -> Self {
        Self::InvalidType { field, expected }
    }
}

impl OutgoingMessage {
    /// Builds a message from a loosely typed field bag, checking every field's shape and
    /// then the cross field rules of [`Self::validate`].
    pub fn from_bag(bag: &Value, local_number: &str) -> Result<Self, ValidationError> {
        let fields = Fields::root(bag)?;

        let recipients = match fields.get("recipients") {
            Some(Value::Array(_)) => fields.str_list("recipients")?,
            _ => return Err(ValidationError::invalid("recipients".into(), "a list")),
        };
        let timestamp = fields
            .opt_u64("timestamp")?
            .ok_or_else(|| ValidationError::invalid("timestamp".into(), "an integer"))?;

        let message = OutgoingMessage {
            recipients,
            timestamp,
            body: fields.opt_str("body")?,
            attachments: fields
                .objects("attachments")?
                .iter()
                .map(attachment)
                .collect::<Result<_, _>>()?,
            quote: fields.opt_object("quote")?.map(|q| quote(&q)).transpose()?,
            group: fields.opt_object("group")?.map(|g| group(&g)).transpose()?,
            forward_context: fields
                .opt_object("forwardContext")?
                .map(|f| forward_context(&f))
                .transpose()?,
            contacts: fields
                .objects("contacts")?
                .iter()
                .map(contact)
                .collect::<Result<_, _>>()?,
            recall: fields.opt_object("recall")?.map(|r| recall(&r)).transpose()?,
            task: fields.opt_object("task")?.map(|t| task(&t)).transpose()?,
            vote: fields.opt_object("vote")?.map(|v| vote(&v)).transpose()?,
            card: fields.opt_object("card")?.map(|c| card(&c)).transpose()?,
            thread_context: fields
                .opt_object("threadContext")?
                .map(|t| thread_context(&t))
                .transpose()?,
            reaction: fields
                .opt_object("reaction")?
                .map(|r| reaction(&r))
                .transpose()?,
            expire_timer: fields.opt_u32("expireTimer")?,
            flags: fields.opt_u32("flags")?,
            profile_key: fields.opt_base64("profileKey")?,
            message_mode: fields
                .opt_i32("messageMode")?
                .map(|m| {
                    MessageMode::try_from(m).map_err(|_| {
                        ValidationError::invalid("messageMode".into(), "a message mode")
                    })
                })
                .transpose()?,
        };

        message.validate(local_number)?;
        Ok(message)
    }

    /// Cross field rules. Pure, and must pass before any network or storage side effect.
    pub fn validate(&self, local_number: &str) -> Result<(), ValidationError> {
        if self.group.is_none() && self.recipients.len() != 1 {
            return Err(ValidationError::RecipientCount(self.recipients.len()));
        }

        if self.is_end_session() {
            if self.body.is_some() {
                return Err(ValidationError::EndSession("body"));
            }
            if self.group.is_some() {
                return Err(ValidationError::EndSession("group"));
            }
            if !self.attachments.is_empty() {
                return Err(ValidationError::EndSession("attachments"));
            }
        }

        if let Some(group) = &self.group {
            non_empty(&group.id, "group.id")?;
        }

        if let Some(source) = self.recall.as_ref().and_then(|r| r.real_source.as_ref()) {
            if source.timestamp.is_none() {
                return Err(ValidationError::Missing("recall.realSource.timestamp".into()));
            }
            if source.source != local_number {
                return Err(ValidationError::ForeignRecall {
                    found: source.source.clone(),
                });
            }
        }

        if let Some(task) = &self.task {
            non_empty(&task.task_id, "task.taskId")?;
            non_empty(&task.name, "task.name")?;
        }

        if let Some(vote) = &self.vote {
            non_empty(&vote.vote_id, "vote.voteId")?;
            non_empty(&vote.name, "vote.name")?;
        }

        if let Some(card) = &self.card {
            non_empty(&card.content, "card.content")?;
        }

        if let Some(thread) = &self.thread_context {
            non_empty(&thread.source.source, "threadContext.source.source")?;
            if !thread.thread_compatible && !thread.topic_compatible {
                return Err(ValidationError::ThreadCompatibility);
            }
            if thread.topic_compatible {
                if thread.topic_type.is_none() {
                    return Err(ValidationError::Missing("threadContext.type".into()));
                }
                if thread.support_type.is_none() {
                    return Err(ValidationError::Missing("threadContext.supportType".into()));
                }
                if thread.topic_id.is_none() {
                    return Err(ValidationError::Missing("threadContext.topicId".into()));
                }
            }
        }

        if let Some(reaction) = &self.reaction {
            non_empty(&reaction.source.source, "reaction.source.source")?;
            if reaction.source.timestamp.is_none() {
                return Err(ValidationError::Missing("reaction.source.timestamp".into()));
            }
            if reaction.source.source_device.is_none() {
                return Err(ValidationError::Missing("reaction.source.sourceDevice".into()));
            }
        }

        Ok(())
    }
}

fn non_empty(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty(field.into()));
    }
    Ok(())
}

/// Read access to one JSON object, remembering its path for error messages.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Fields<'a> {
    fn root(value: &'a Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Ok(Self {
                map,
                path: String::new(),
            }),
            _ => Err(ValidationError::invalid("message".into(), "an object")),
        }
    }

    fn name(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    /// `null` counts as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn opt_u64(&self, key: &str) -> Result<Option<u64>, ValidationError> {
        self.get(key)
            .map(|v| {
                v.as_u64().ok_or_else(|| {
                    ValidationError::invalid(self.name(key), "a non-negative integer")
                })
            })
            .transpose()
    }

    fn opt_u32(&self, key: &str) -> Result<Option<u32>, ValidationError> {
        self.opt_u64(key)?
            .map(|v| {
                u32::try_from(v)
                    .map_err(|_| ValidationError::invalid(self.name(key), "a 32-bit integer"))
            })
            .transpose()
    }

    fn opt_i32(&self, key: &str) -> Result<Option<i32>, ValidationError> {
        self.get(key)
            .map(|v| {
                v.as_i64()
                    .and_then(|v| i32::try_from(v).ok())
                    .ok_or_else(|| ValidationError::invalid(self.name(key), "an integer"))
            })
            .transpose()
    }

    fn opt_bool(&self, key: &str) -> Result<Option<bool>, ValidationError> {
        self.get(key)
            .map(|v| {
                v.as_bool()
                    .ok_or_else(|| ValidationError::invalid(self.name(key), "a boolean"))
            })
            .transpose()
    }

    fn opt_str(&self, key: &str) -> Result<Option<String>, ValidationError> {
        self.get(key)
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ValidationError::invalid(self.name(key), "a string"))
            })
            .transpose()
    }

    fn str(&self, key: &str) -> Result<String, ValidationError> {
        self.opt_str(key)?
            .ok_or_else(|| ValidationError::Missing(self.name(key)))
    }

    fn opt_base64(&self, key: &str) -> Result<Option<Vec<u8>>, ValidationError> {
        self.opt_str(key)?
            .map(|s| {
                BASE64
                    .decode(s)
                    .map_err(|_| ValidationError::invalid(self.name(key), "base64"))
            })
            .transpose()
    }

    fn opt_object(&self, key: &str) -> Result<Option<Fields<'a>>, ValidationError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(Fields {
                map,
                path: self.name(key),
            })),
            Some(_) => Err(ValidationError::invalid(self.name(key), "an object")),
        }
    }

    fn object(&self, key: &str) -> Result<Fields<'a>, ValidationError> {
        self.opt_object(key)?
            .ok_or_else(|| ValidationError::Missing(self.name(key)))
    }

    /// Absent lists are empty.
    fn list(&self, key: &str) -> Result<&'a [Value], ValidationError> {
        match self.get(key) {
            None => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(ValidationError::invalid(self.name(key), "a list")),
        }
    }

    fn str_list(&self, key: &str) -> Result<Vec<String>, ValidationError> {
        self.list(key)?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    ValidationError::invalid(format!("{}[{i}]", self.name(key)), "a string")
                })
            })
            .collect()
    }

    fn objects(&self, key: &str) -> Result<Vec<Fields<'a>>, ValidationError> {
        self.list(key)?
            .iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::Object(map) => Ok(Fields {
                    map,
                    path: format!("{}[{i}]", self.name(key)),
                }),
                _ => Err(ValidationError::invalid(
                    format!("{}[{i}]", self.name(key)),
                    "an object",
                )),
            })
            .collect()
    }
}

fn attachment_data(value: Option<&Value>) -> AttachmentData {
    let Some(value) = value else {
        return AttachmentData::Missing;
    };
    match value {
        Value::Array(items) => items
            .iter()
            .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(AttachmentData::Bytes)
            .unwrap_or(AttachmentData::Unsupported { found: "list" }),
        Value::String(_) => AttachmentData::Unsupported { found: "string" },
        Value::Object(_) => AttachmentData::Unsupported { found: "object" },
        Value::Number(_) => AttachmentData::Unsupported { found: "number" },
        Value::Bool(_) => AttachmentData::Unsupported { found: "boolean" },
        Value::Null => AttachmentData::Missing,
    }
}

fn attachment(fields: &Fields<'_>) -> Result<Attachment, ValidationError> {
    Ok(Attachment {
        data: attachment_data(fields.get("data")),
        content_type: fields.opt_str("contentType")?.unwrap_or_default(),
        file_name: fields.opt_str("fileName")?,
        width: fields.opt_u32("width")?,
        height: fields.opt_u32("height")?,
        caption: fields.opt_str("caption")?,
        flags: fields.opt_u32("flags")?,
        rapid_key: fields.opt_str("rapidKey")?,
        rapid_size: fields.opt_u32("rapidSize")?,
        resolved: None,
    })
}

fn quote(fields: &Fields<'_>) -> Result<Quote, ValidationError> {
    let attachments = fields
        .objects("attachments")?
        .iter()
        .map(|a| {
            Ok(QuotedAttachment {
                content_type: a.opt_str("contentType")?.unwrap_or_default(),
                file_name: a.opt_str("fileName")?,
                thumbnail: a.opt_object("thumbnail")?.map(|t| attachment(&t)).transpose()?,
            })
        })
        .collect::<Result<_, ValidationError>>()?;
    Ok(Quote {
        id: fields.opt_u64("id")?,
        author: fields.opt_str("author")?,
        text: fields.opt_str("text")?,
        attachments,
    })
}

fn group(fields: &Fields<'_>) -> Result<GroupInfo, ValidationError> {
    let id = match fields.get("id") {
        Some(Value::String(id)) => id.clone(),
        _ => return Err(ValidationError::invalid(fields.name("id"), "a string")),
    };
    let r#type = fields
        .opt_i32("type")?
        .ok_or_else(|| ValidationError::invalid(fields.name("type"), "an integer"))?;
    let r#type = GroupType::try_from(r#type)
        .map_err(|_| ValidationError::invalid(fields.name("type"), "a group type"))?;
    Ok(GroupInfo {
        id,
        r#type,
        name: fields.opt_str("name")?,
        members: fields.str_list("members")?,
    })
}

fn forward_context(fields: &Fields<'_>) -> Result<ForwardContext, ValidationError> {
    let rapid_files = fields
        .objects("rapidFiles")?
        .iter()
        .map(|f| {
            Ok(RapidFile {
                rapid_hash: f.str("rapidHash")?,
                authorize_id: f.str("authorizeId")?,
            })
        })
        .collect::<Result<_, ValidationError>>()?;
    Ok(ForwardContext {
        forwards: forward_nodes(fields)?,
        rapid_files,
    })
}

fn forward_nodes(fields: &Fields<'_>) -> Result<Vec<ForwardNode>, ValidationError> {
    fields
        .objects("forwards")?
        .iter()
        .map(|node| {
            Ok(ForwardNode {
                id: node.opt_u64("id")?,
                r#type: node.opt_u32("type")?,
                is_from_group: node.opt_bool("isFromGroup")?,
                author: node.opt_str("author")?,
                body: node.opt_str("body")?,
                card: node.opt_object("card")?.map(|c| card(&c)).transpose()?,
                attachments: node
                    .objects("attachments")?
                    .iter()
                    .map(attachment)
                    .collect::<Result<_, _>>()?,
                mentions: node
                    .objects("mentions")?
                    .iter()
                    .map(|m| {
                        Ok(Mention {
                            start: m.opt_u32("start")?,
                            length: m.opt_u32("length")?,
                            uid: m.opt_str("uid")?,
                            r#type: m.opt_u32("type")?,
                        })
                    })
                    .collect::<Result<_, ValidationError>>()?,
                forwards: forward_nodes(node)?,
            })
        })
        .collect()
}

fn contact(fields: &Fields<'_>) -> Result<Contact, ValidationError> {
    Ok(Contact {
        display_name: fields.opt_str("displayName")?,
        numbers: fields.str_list("numbers")?,
        emails: fields.str_list("emails")?,
        organization: fields.opt_str("organization")?,
    })
}

fn real_source(fields: &Fields<'_>) -> Result<RealSource, ValidationError> {
    let source = match fields.get("source") {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(ValidationError::invalid(fields.name("source"), "a string")),
    };
    Ok(RealSource {
        source,
        source_device: fields.opt_u32("sourceDevice")?,
        timestamp: fields.opt_u64("timestamp")?,
        server_timestamp: fields.opt_u64("serverTimestamp")?,
        sequence_id: fields.opt_u64("sequenceId")?,
        notify_sequence_id: fields.opt_u64("notifySequenceId")?,
    })
}

fn recall(fields: &Fields<'_>) -> Result<Recall, ValidationError> {
    Ok(Recall {
        real_source: fields
            .opt_object("realSource")?
            .map(|s| real_source(&s))
            .transpose()?,
    })
}

fn task(fields: &Fields<'_>) -> Result<Task, ValidationError> {
    Ok(Task {
        task_id: fields.str("taskId")?,
        name: fields.str("name")?,
        version: fields.opt_u32("version")?,
        creator: fields.opt_str("creator")?,
        timestamp: fields.opt_u64("timestamp")?,
        assignees: fields.str_list("assignees")?,
        due_time: fields.opt_u64("dueTime")?,
        priority: fields.opt_u32("priority")?,
        description: fields.opt_str("description")?,
        status: fields.opt_u32("status")?,
    })
}

fn vote(fields: &Fields<'_>) -> Result<Vote, ValidationError> {
    let options = fields
        .objects("options")?
        .iter()
        .map(|o| {
            Ok(VoteOption {
                id: o.opt_u32("id")?,
                name: o.opt_str("name")?,
            })
        })
        .collect::<Result<_, ValidationError>>()?;
    Ok(Vote {
        vote_id: fields.str("voteId")?,
        name: fields.str("name")?,
        version: fields.opt_u32("version")?,
        creator: fields.opt_str("creator")?,
        options,
        multiple: fields.opt_bool("multiple")?,
        due_time: fields.opt_u64("dueTime")?,
        anonymous: fields.opt_bool("anonymous")?,
        status: fields.opt_u32("status")?,
    })
}

fn card(fields: &Fields<'_>) -> Result<Card, ValidationError> {
    Ok(Card {
        content: fields.str("content")?,
        app_id: fields.opt_str("appId")?,
        card_id: fields.opt_str("cardId")?,
        version: fields.opt_u32("version")?,
        creator: fields.opt_str("creator")?,
        timestamp: fields.opt_u64("timestamp")?,
        content_type: fields.opt_u32("contentType")?,
        r#type: fields.opt_u32("type")?,
        fixed_width: fields.opt_bool("fixedWidth")?,
    })
}

fn thread_context(fields: &Fields<'_>) -> Result<ThreadContext, ValidationError> {
    Ok(ThreadContext {
        source: real_source(&fields.object("source")?)?,
        reply_to_user: fields.opt_bool("replyToUser")?,
        bot_id: fields.opt_str("botId")?,
        thread_compatible: fields.opt_bool("threadCompatible")?.unwrap_or(false),
        topic_compatible: fields.opt_bool("topicCompatible")?.unwrap_or(false),
        topic_type: fields.opt_u32("type")?,
        support_type: fields.opt_u32("supportType")?,
        topic_id: fields.opt_str("topicId")?,
        group_id: fields.opt_str("groupId")?,
    })
}

fn reaction(fields: &Fields<'_>) -> Result<Reaction, ValidationError> {
    let emoji = match fields.get("emoji") {
        Some(Value::String(e)) => e.clone(),
        _ => return Err(ValidationError::invalid(fields.name("emoji"), "a string")),
    };
    Ok(Reaction {
        source: real_source(&fields.object("source")?)?,
        emoji,
        remove: fields.opt_bool("remove")?.unwrap_or(false),
    })
}
