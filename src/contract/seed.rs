//! Demo ledger contents written by `initLedger`.

use crate::types::{Card, CardItem, Company, User};

pub(crate) fn users() -> Vec<User> {
    let user = |first: &str, last: &str, image: &str, hash: &str| User {
        first_name: first.into(),
        last_name: last.into(),
        image_url: image.into(),
        hash: hash.into(),
    };

    vec![
        user(
            "Pavel",
            "Pantyukhov",
            "https://pp.userapi.com/c638918/v638918847/3d1d9/s_auB5cvB6M.jpg",
            "3u891738291hdiawhduiawdhiuawd",
        ),
        user(
            "Pavel",
            "Pantyukhov",
            "https://pp.userapi.com/c638918/v638918847/3d1d9/s_auB5cvB6M.jpg",
            "3u891738291hdiawhduiawdhiuawd",
        ),
        user(
            "Maksim",
            "Kuznetsov",
            "https://pp.userapi.com/c307310/v307310903/602d/Gyr1qLrB23Q.jpg",
            "2903821390218390jdioawjdiowajdoiaw",
        ),
        user("Yakov", "Kanner", "", "1892737128djwaiodjiawodjwoi"),
        user("Vitaliy", "Melnik", "", "1231jdlawmdklawjdklawnmdlkwandjakwn"),
        user("Vladimir", "Ivanov", "", "mcjkz7873827381hdaw"),
    ]
}

pub(crate) fn companies() -> Vec<Company> {
    [
        "НИИ онкологии им. Н.Н. Петрова",
        "Университетская Клиника",
        "Городской Клинический Онкологический Диспансер",
        "Медлайн-Сервис на Октябрьском поле",
        "Он клиник на Новом Арбате",
        "Центр эндохирургии и литотрипсии (ЦЭЛТ)",
        "Клиника Столица на Ленинском, 90",
        "Клиника Столица на Арбате",
        "Европейский медицинский центр на ул. Щепкина",
        "ЭлЭн",
        "Ортодонт комплекс",
        "Simpladent на Дмитровской",
        "Simpladent на Пролетарской",
        "Перинатальный медицинский центр Мать и Дитя",
        "Медлайн-Сервис на Полежаевской",
        "Медлайн-Сервис на Сходненской",
        "Медлайн-Сервис на Октябрьском поле",
        "Медлайн-Сервис на ВДНХ",
    ]
    .iter()
    .map(|name| Company {
        name: (*name).to_string(),
    })
    .collect()
}

pub(crate) fn card(user_key: &str, company_key: &str) -> Card {
    Card {
        user_id: user_key.into(),
        company_id: company_key.into(),
        name: "Карточка".into(),
    }
}

pub(crate) fn card_item(card_key: &str) -> CardItem {
    CardItem {
        card_id: card_key.into(),
        key: "Принятие таблетки 1".into(),
        value: "1".into(),
        additional_data: "Заметка врача".into(),
        date: "2017.06.18".into(),
    }
}
