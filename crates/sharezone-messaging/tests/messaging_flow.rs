use uuid::Uuid;

use sharezone_db::Database;
use sharezone_messaging::conversation::HistoryQuery;
use sharezone_messaging::{MessagingError, Messenger, ValidationError};
use sharezone_types::models::{Sharer, Transaction, UserFilter};

struct World {
    db: Database,
    z1: Uuid,
    z2: Uuid,
    admin: Sharer,
    tom: Sharer,
    jerry: Sharer,
    mickey: Sharer,
}

fn world() -> World {
    let db = Database::open_in_memory().unwrap();
    let z1 = db
        .create_sharezone(Uuid::new_v4(), "Rochester Institute of Technology", "A University in Rochester")
        .unwrap()
        .id;
    let z2 = db
        .create_sharezone(Uuid::new_v4(), "University of Rochester", "Another University in Rochester")
        .unwrap()
        .id;

    let admin = db.create_sharer(Uuid::new_v4(), "admin", "Admin", Some(z1)).unwrap();
    db.add_admin(z1, admin.id).unwrap();
    let tom = db.create_sharer(Uuid::new_v4(), "tom", "Tom", Some(z1)).unwrap();
    let jerry = db.create_sharer(Uuid::new_v4(), "jerry", "Jerry", Some(z1)).unwrap();
    let mickey = db.create_sharer(Uuid::new_v4(), "mickey", "Mickey", Some(z2)).unwrap();
    db.add_admin(z2, mickey.id).unwrap();

    World { db, z1, z2, admin, tom, jerry, mickey }
}

fn validation(err: MessagingError) -> ValidationError {
    match err {
        MessagingError::Validation(e) => e,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn send_escapes_body_and_rejects_other_sharezones() {
    let w = world();
    let messenger = Messenger::new(&w.db);

    let sent = messenger.send_message(&w.tom, "jerry", "<b>hi</b>").unwrap();
    assert_eq!(sent.body, "&lt;b&gt;hi&lt;/b&gt;");
    assert_eq!(w.db.get_message(sent.id).unwrap().body, "&lt;b&gt;hi&lt;/b&gt;");
    assert_eq!(sent.sharezone, w.z1);

    let err = messenger.send_message(&w.tom, "mickey", "hello").unwrap_err();
    assert_eq!(validation(err), ValidationError::CrossSharezone);

    let err = messenger.send_message(&w.mickey, "tom", "hello").unwrap_err();
    assert_eq!(validation(err), ValidationError::CrossSharezone);

    let err = messenger.send_message(&w.tom, "tom", "Hi me!").unwrap_err();
    assert_eq!(validation(err), ValidationError::SelfMessage);

    let err = messenger.send_message(&w.tom, "keyboard_smash", "dskljdapwjpi").unwrap_err();
    assert_eq!(validation(err), ValidationError::RecipientNotFound);

    let err = messenger.send_message(&w.tom, "jerry", "").unwrap_err();
    assert_eq!(validation(err), ValidationError::EmptyBody);
}

#[test]
fn inbox_groups_marks_read_and_counts() {
    let w = world();
    let messenger = Messenger::new(&w.db);

    let m1 = messenger.send_message(&w.tom, "jerry", "first").unwrap();
    let m2 = messenger.send_message(&w.tom, "jerry", "second").unwrap();
    let m3 = messenger.send_message(&w.admin, "jerry", "from admin").unwrap();
    messenger.send_message(&w.jerry, "tom", "not in jerry's inbox").unwrap();

    assert_eq!(messenger.unread_count(&w.jerry).unwrap(), 3);

    let inbox = messenger.list_inbox(&w.jerry).unwrap();
    let shape: Vec<(String, Vec<Uuid>)> = inbox
        .iter()
        .map(|c| (c.correspondent.clone(), c.messages.iter().map(|m| m.id).collect()))
        .collect();
    assert_eq!(
        shape,
        vec![("Admin".to_string(), vec![m3.id]), ("Tom".to_string(), vec![m2.id, m1.id])]
    );
    assert!(inbox.iter().flat_map(|c| &c.messages).all(|m| m.read));

    assert_eq!(messenger.unread_count(&w.jerry).unwrap(), 0);
    assert_eq!(messenger.unread_count(&w.tom).unwrap(), 1);
    assert!(w.db.get_message(m1.id).unwrap().read);

    // listing again is harmless
    let again = messenger.list_inbox(&w.jerry).unwrap();
    assert_eq!(again.len(), 2);
}

#[test]
fn reply_goes_to_original_sender() {
    let w = world();
    let messenger = Messenger::new(&w.db);

    let original = messenger.send_message(&w.tom, "jerry", "Hello World!").unwrap();
    let reply = messenger.reply_to(&w.jerry, original.id, "Hi <Tom>").unwrap();
    assert!(reply.from_user.is(&w.jerry));
    assert!(reply.to_user.is(&w.tom));
    assert_eq!(reply.body, "Hi &lt;Tom&gt;");

    let err = messenger.reply_to(&w.jerry, original.id, "  ").unwrap_err();
    assert_eq!(validation(err), ValidationError::EmptyBody);

    // only the recipient may reply
    let err = messenger.reply_to(&w.admin, original.id, "butting in").unwrap_err();
    assert!(matches!(err, MessagingError::NotFound));

    let err = messenger.reply_to(&w.jerry, Uuid::new_v4(), "anyone?").unwrap_err();
    assert!(matches!(err, MessagingError::NotFound));
}

#[test]
fn reply_after_sender_moved_is_rejected() {
    let w = world();
    let messenger = Messenger::new(&w.db);

    let original = messenger.send_message(&w.tom, "jerry", "see you").unwrap();
    w.db.set_sharezone(w.tom.id, Some(w.z2)).unwrap();

    let err = messenger.reply_to(&w.jerry, original.id, "wait").unwrap_err();
    assert_eq!(validation(err), ValidationError::CrossSharezone);
    // the original stays readable where it was sent
    assert_eq!(w.db.get_message(original.id).unwrap().sharezone, w.z1);
}

#[test]
fn delete_preview_confirm_cancel() {
    let w = world();
    let messenger = Messenger::new(&w.db);
    let msg = messenger.send_message(&w.tom, "jerry", "delete me").unwrap();

    let preview = messenger.preview_delete(&w.jerry, msg.id).unwrap();
    assert_eq!(preview.id, msg.id);

    messenger.cancel_delete(&w.jerry, msg.id);
    assert!(w.db.get_message(msg.id).is_ok());

    let err = messenger.confirm_delete(&w.tom, msg.id).unwrap_err();
    assert!(matches!(err, MessagingError::NotFound));

    let copy = messenger.confirm_delete(&w.jerry, msg.id).unwrap();
    assert_eq!(copy.body, "delete me");
    assert!(copy.from_user.is(&w.tom));

    assert!(matches!(messenger.preview_delete(&w.jerry, msg.id), Err(MessagingError::NotFound)));
    assert!(matches!(messenger.confirm_delete(&w.jerry, msg.id), Err(MessagingError::NotFound)));
    assert!(w.db.get_message(msg.id).is_err());
}

#[test]
fn history_is_scoped_and_filtered() {
    let w = world();
    let messenger = Messenger::new(&w.db);
    let bob = w.db.create_sharer(Uuid::new_v4(), "bob", "Bob", Some(w.z1)).unwrap();
    let alice = w.db.create_sharer(Uuid::new_v4(), "alice", "Alice", Some(w.z1)).unwrap();
    let stranger = w.db.create_sharer(Uuid::new_v4(), "stranger", "Stranger", Some(w.z2)).unwrap();

    messenger.send_message(&w.tom, "bob", "tom to bob").unwrap();
    messenger.send_message(&w.jerry, "bob", "jerry to bob").unwrap();
    messenger.send_message(&w.tom, "alice", "tom to alice").unwrap();
    messenger.send_message(&stranger, "mickey", "other sharezone").unwrap();

    let to_bob = HistoryQuery {
        from: UserFilter::Any,
        to: UserFilter::Username("bob".into()),
    };
    let history = messenger.list_history(&w.admin, &to_bob).unwrap();
    let keys: Vec<(&str, &str)> = history.buckets.iter().map(|b| (b.from.as_str(), b.to.as_str())).collect();
    assert_eq!(keys, vec![("Jerry", "Bob"), ("Tom", "Bob")]);

    let all = messenger.list_history(&w.admin, &HistoryQuery::any()).unwrap();
    assert_eq!(all.buckets.len(), 3);
    assert!(all.buckets.iter().all(|b| b.from != "Stranger"));
    let usernames: Vec<&str> = all.users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(usernames, vec!["admin", "alice", "bob", "jerry", "tom"]);

    let pair = HistoryQuery {
        from: UserFilter::Username("alice".into()),
        to: UserFilter::Username("tom".into()),
    };
    assert!(messenger.list_history(&w.admin, &pair).unwrap().buckets.is_empty());

    let err = messenger.list_history(&alice, &HistoryQuery::any()).unwrap_err();
    assert!(matches!(err, MessagingError::NotAdmin));

    // mickey administers the other sharezone and sees only that one
    let theirs = messenger.list_history(&w.mickey, &HistoryQuery::any()).unwrap();
    assert_eq!(theirs.buckets.len(), 1);
    assert_eq!((theirs.buckets[0].from.as_str(), theirs.buckets[0].to.as_str()), ("Stranger", "Mickey"));

    w.db.set_global_admin(bob.id, true).unwrap();
    let bob = messenger.session_user(bob.id).unwrap();
    let everything = messenger.list_history(&bob, &HistoryQuery::any()).unwrap();
    assert_eq!(everything.buckets.len(), 4);
    assert_eq!(everything.users.len(), 7);
}

#[test]
fn recipients_exclude_self_and_other_sharezones() {
    let w = world();
    let messenger = Messenger::new(&w.db);
    w.db.create_shed_sender(Uuid::new_v4(), w.z1, "RIT Shed").unwrap();

    let names: Vec<String> = messenger
        .list_recipients(&w.tom)
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, vec!["admin", "jerry"]);
}

#[test]
fn confirmation_lands_in_inbox() {
    let w = world();
    let messenger = Messenger::new(&w.db);
    w.db.create_shed_sender(Uuid::new_v4(), w.z1, "RIT Shed").unwrap();

    let transaction = Transaction {
        id: Uuid::new_v4(),
        sharezone: w.z1,
        tool: "Ladder".into(),
        from_user: w.tom.clone(),
        to_user: w.jerry.clone(),
    };
    let notice = messenger.send_confirmation(&transaction).unwrap();
    assert!(notice.body.contains(&format!("/transaction/confirm/{}", transaction.id)));

    let inbox = messenger.list_inbox(&w.jerry).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].correspondent, "RIT Shed");

    // system senders cannot be replied to
    let err = messenger.reply_to(&w.jerry, notice.id, "thanks").unwrap_err();
    assert_eq!(validation(err), ValidationError::RecipientNotFound);
}
